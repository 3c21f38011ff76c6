use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::errors::MarsCoreError;

///
/// Normal density used as a weighting kernel.
///
/// The optional second dimension (`y0`, `y_sigma`) is only read by [`Gaussian::value_2d`].
/// `duration` is an external weight carried along for weighted aggregation, it is not part
/// of the density.
///
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gaussian {
    pub x0: f64,
    pub x_sigma: f64,
    pub y0: f64,
    pub y_sigma: f64,
    pub normalization: f64,
    pub duration: f64,
}

impl Gaussian {
    ///
    /// Create a 1D kernel. `x_sigma` must not be zero; use [`Gaussian::try_new`] when the
    /// value comes from untrusted input.
    ///
    pub fn new(x0: f64, x_sigma: f64) -> Self {
        Gaussian {
            x0,
            x_sigma,
            y0: 0.0,
            y_sigma: f64::NAN,
            normalization: 1.0 / ((2.0 * PI).sqrt() * x_sigma),
            duration: 1.0,
        }
    }

    pub fn new_2d(x0: f64, x_sigma: f64, y0: f64, y_sigma: f64) -> Self {
        let mut gaussian = Gaussian::new(x0, x_sigma);
        gaussian.y0 = y0;
        gaussian.y_sigma = y_sigma;
        gaussian
    }

    ///
    /// Checked constructor: rejects zero, negative and non-finite sigma.
    ///
    pub fn try_new(x0: f64, x_sigma: f64) -> Result<Self, MarsCoreError> {
        if !(x_sigma > 0.0 && x_sigma.is_finite()) {
            return Err(MarsCoreError::NonPositiveSigma(x_sigma));
        }
        Ok(Gaussian::new(x0, x_sigma))
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    pub fn set_y0(&mut self, y0: f64) {
        self.y0 = y0;
    }

    pub fn set_y_sigma(&mut self, y_sigma: f64) {
        self.y_sigma = y_sigma;
    }

    pub fn set_duration(&mut self, duration: f64) {
        self.duration = duration;
    }

    /// Density at `x`.
    pub fn value(&self, x: f64) -> f64 {
        let dx = x - self.x0;
        self.normalization * (-(dx * dx) / (2.0 * self.x_sigma * self.x_sigma)).exp()
    }

    /// Product-form 2D density at `(x, y)`.
    pub fn value_2d(&self, x: f64, y: f64) -> f64 {
        let dy = y - self.y0;
        let y_normalization = 1.0 / ((2.0 * PI).sqrt() * self.y_sigma);
        self.value(x) * y_normalization * (-(dy * dy) / (2.0 * self.y_sigma * self.y_sigma)).exp()
    }

    ///
    /// Midpoint-rule integral of the 1D density over `[from, to]` using `steps` sub-intervals.
    ///
    pub fn integrate(&self, from: f64, to: f64, steps: usize) -> f64 {
        if steps == 0 {
            return 0.0;
        }
        let step = (to - from) / steps as f64;
        (0..steps)
            .map(|i| self.value(from + (i as f64 + 0.5) * step))
            .sum::<f64>()
            * step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::*;

    const FRAC_1_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

    #[rstest]
    fn test_peak_value() {
        let gaussian = Gaussian::new(0.0, 1.0);
        assert!((gaussian.value(0.0) - FRAC_1_SQRT_2PI).abs() < 1e-12);
    }

    #[rstest]
    #[case(0.0, 1.0)]
    #[case(5.0, 0.25)]
    #[case(-3.0, 4.0)]
    fn test_integrates_to_one(#[case] x0: f64, #[case] sigma: f64) {
        let gaussian = Gaussian::new(x0, sigma);
        let total = gaussian.integrate(x0 - 10.0 * sigma, x0 + 10.0 * sigma, 10_000);
        assert!((total - 1.0).abs() < 1e-6, "integral was {}", total);
    }

    #[rstest]
    fn test_symmetry() {
        let gaussian = Gaussian::new(2.0, 0.5);
        assert!((gaussian.value(1.3) - gaussian.value(2.7)).abs() < 1e-15);
    }

    #[rstest]
    fn test_2d_is_product_of_marginals() {
        let gaussian = Gaussian::new_2d(1.0, 2.0, -1.0, 0.5);
        let y_marginal = Gaussian::new(-1.0, 0.5);
        let expected = gaussian.value(0.3) * y_marginal.value(-0.2);
        assert!((gaussian.value_2d(0.3, -0.2) - expected).abs() < 1e-15);
    }

    #[rstest]
    fn test_setters_assemble_2d_kernel() {
        let mut gaussian = Gaussian::new(0.0, 1.0);
        gaussian.set_y0(3.0);
        gaussian.set_y_sigma(1.0);
        gaussian.set_duration(12.5);
        assert!((gaussian.value_2d(0.0, 3.0) - FRAC_1_SQRT_2PI * FRAC_1_SQRT_2PI).abs() < 1e-12);
        assert_eq!(gaussian.duration, 12.5);
    }

    #[rstest]
    #[case(0.0)]
    #[case(-1.0)]
    #[case(f64::NAN)]
    fn test_try_new_rejects_bad_sigma(#[case] sigma: f64) {
        assert!(matches!(
            Gaussian::try_new(0.0, sigma),
            Err(MarsCoreError::NonPositiveSigma(_))
        ));
    }

    #[rstest]
    fn test_default_duration_weight() {
        assert_eq!(Gaussian::new(0.0, 1.0).duration, 1.0);
        assert_eq!(Gaussian::new(0.0, 1.0).with_duration(4.0).duration, 4.0);
    }
}
