//! Closed-form weighted fits of a straight line or a constant level.
//!
//! Every sample carries the same uncertainty `sigma`, so the weighted normal equations reduce to
//! plain sums. The sums are accumulated once per trace as prefix sums; any index range can then be
//! fitted in constant time, which is what makes the exhaustive split search affordable.

use crate::errors::KcpError;

///
/// Result of fitting `y = a + b·x` (or `y = a` in step mode) to a range of samples.
///
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    pub a: f64,
    pub a_sigma: f64,
    pub b: f64,
    pub b_sigma: f64,
    pub chi_squared: f64,
}

impl LineFit {
    /// Fitted value at `x`.
    pub fn at(&self, x: f64) -> f64 {
        self.a + self.b * x
    }

    fn nan() -> Self {
        LineFit {
            a: f64::NAN,
            a_sigma: f64::NAN,
            b: f64::NAN,
            b_sigma: f64::NAN,
            chi_squared: f64::NAN,
        }
    }
}

/// Sums over samples shifted to a local origin.
#[derive(Debug, Clone, Copy, Default)]
struct Moments {
    n: f64,
    su: f64,
    sv: f64,
    suu: f64,
    suv: f64,
    svv: f64,
}

impl Moments {
    fn push(&self, u: f64, v: f64) -> Moments {
        Moments {
            n: self.n + 1.0,
            su: self.su + u,
            sv: self.sv + v,
            suu: self.suu + u * u,
            suv: self.suv + u * v,
            svv: self.svv + v * v,
        }
    }

    fn minus(&self, other: &Moments) -> Moments {
        Moments {
            n: self.n - other.n,
            su: self.su - other.su,
            sv: self.sv - other.sv,
            suu: self.suu - other.suu,
            suv: self.suv - other.suv,
            svv: self.svv - other.svv,
        }
    }
}

///
/// Prefix sums over one trace, answering fits for any `[lo, hi)` index range.
///
/// Samples are shifted by the first x and the mean y before summing to limit cancellation.
///
pub(crate) struct CumulativeFits {
    origin_x: f64,
    origin_y: f64,
    sigma: f64,
    prefix: Vec<Moments>,
}

impl CumulativeFits {
    pub(crate) fn new(x: &[f64], y: &[f64], sigma: f64) -> Self {
        let origin_x = x.first().copied().unwrap_or(0.0);
        let origin_y = if y.is_empty() {
            0.0
        } else {
            y.iter().sum::<f64>() / y.len() as f64
        };

        let mut prefix = Vec::with_capacity(x.len() + 1);
        let mut running = Moments::default();
        prefix.push(running);
        for (xi, yi) in x.iter().zip(y) {
            running = running.push(xi - origin_x, yi - origin_y);
            prefix.push(running);
        }

        CumulativeFits {
            origin_x,
            origin_y,
            sigma,
            prefix,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.prefix.len() - 1
    }

    fn range(&self, lo: usize, hi: usize) -> Moments {
        self.prefix[hi].minus(&self.prefix[lo])
    }

    pub(crate) fn fit(&self, lo: usize, hi: usize, step_analysis: bool) -> LineFit {
        if step_analysis {
            self.mean(lo, hi)
        } else {
            self.line(lo, hi)
        }
    }

    pub(crate) fn line(&self, lo: usize, hi: usize) -> LineFit {
        let m = self.range(lo, hi);
        if m.n < 1.0 {
            return LineFit::nan();
        }
        if m.n < 2.0 {
            // a single point pins the intercept and leaves the slope undetermined
            return LineFit {
                a: m.sv + self.origin_y,
                a_sigma: self.sigma,
                b: 0.0,
                b_sigma: f64::NAN,
                chi_squared: 0.0,
            };
        }

        let mean_u = m.su / m.n;
        let mean_v = m.sv / m.n;
        let suu_c = m.suu - m.su * mean_u;
        let suv_c = m.suv - m.su * mean_v;
        let svv_c = m.svv - m.sv * mean_v;

        // zero spread in x leaves the slope undefined; NaN flows out as the "no answer" value
        let b = suv_c / suu_c;
        let a = mean_v - b * mean_u + self.origin_y - b * self.origin_x;

        let residual = svv_c - b * suv_c;
        let residual = if residual < 0.0 { 0.0 } else { residual };

        // determinant n·Σ(x-x̄)² is shift invariant; Σx² is not, so restore the origin
        let determinant = m.n * suu_c;
        let sum_xx = m.suu + 2.0 * self.origin_x * m.su + m.n * self.origin_x * self.origin_x;

        LineFit {
            a,
            a_sigma: self.sigma * (sum_xx / determinant).sqrt(),
            b,
            b_sigma: self.sigma / suu_c.sqrt(),
            chi_squared: residual / (self.sigma * self.sigma),
        }
    }

    pub(crate) fn mean(&self, lo: usize, hi: usize) -> LineFit {
        let m = self.range(lo, hi);
        if m.n < 1.0 {
            return LineFit::nan();
        }
        let mean_v = m.sv / m.n;
        let residual = m.svv - m.sv * mean_v;
        let residual = if residual < 0.0 { 0.0 } else { residual };

        LineFit {
            a: mean_v + self.origin_y,
            a_sigma: self.sigma / m.n.sqrt(),
            b: 0.0,
            b_sigma: 0.0,
            chi_squared: residual / (self.sigma * self.sigma),
        }
    }
}

pub(crate) fn validate(x: &[f64], y: &[f64], sigma: f64) -> Result<(), KcpError> {
    if x.len() != y.len() {
        return Err(KcpError::MismatchedLengths(x.len(), y.len()));
    }
    if !(sigma.is_finite() && sigma > 0.0) {
        return Err(KcpError::NonPositiveSigma(sigma));
    }
    Ok(())
}

///
/// Weighted least-squares straight line through `(x, y)`, every point with uncertainty `sigma`.
///
/// Standard errors are the absolute ones implied by `sigma`, not rescaled by the fit quality.
/// An empty input gives an all-NaN fit; a single point gives `b = 0` with an undefined `b_sigma`.
///
/// # Arguments
/// - x: sample positions
/// - y: sample values
/// - sigma: per-sample uncertainty, must be positive
///
pub fn fit_line(x: &[f64], y: &[f64], sigma: f64) -> Result<LineFit, KcpError> {
    validate(x, y, sigma)?;
    Ok(CumulativeFits::new(x, y, sigma).line(0, x.len()))
}

///
/// Weighted mean of `y`, reported as a zero-slope line.
///
pub fn fit_mean(x: &[f64], y: &[f64], sigma: f64) -> Result<LineFit, KcpError> {
    validate(x, y, sigma)?;
    Ok(CumulativeFits::new(x, y, sigma).mean(0, x.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9 * (1.0 + expected.abs()),
            "{} != {}",
            actual,
            expected
        );
    }

    #[rstest]
    fn test_exact_line() {
        let x: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| 3.0 - 0.5 * v).collect();
        let fit = fit_line(&x, &y, 1.0).unwrap();
        assert_close(fit.a, 3.0);
        assert_close(fit.b, -0.5);
        assert!(fit.chi_squared < 1e-9);
    }

    #[rstest]
    fn test_standard_errors_match_closed_form() {
        // S = n/σ², Δ = S·Sxx - Sx², σA² = Sxx/Δ, σB² = S/Δ
        let x = [1.0, 2.0, 4.0, 7.0];
        let y = [2.0, 2.5, 4.5, 6.0];
        let sigma = 0.5;
        let w = 1.0 / (sigma * sigma);
        let s = 4.0 * w;
        let sx: f64 = x.iter().sum::<f64>() * w;
        let sxx: f64 = x.iter().map(|v| v * v).sum::<f64>() * w;
        let delta = s * sxx - sx * sx;

        let fit = fit_line(&x, &y, sigma).unwrap();
        assert_close(fit.a_sigma, (sxx / delta).sqrt());
        assert_close(fit.b_sigma, (s / delta).sqrt());

        let chi_squared: f64 = x
            .iter()
            .zip(&y)
            .map(|(xi, yi)| ((yi - fit.at(*xi)) / sigma).powi(2))
            .sum();
        assert_close(fit.chi_squared, chi_squared);
    }

    #[rstest]
    fn test_mean_fit() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [1.0, 3.0, 1.0, 3.0];
        let fit = fit_mean(&x, &y, 2.0).unwrap();
        assert_eq!(fit.b, 0.0);
        assert_eq!(fit.b_sigma, 0.0);
        assert_close(fit.a, 2.0);
        assert_close(fit.a_sigma, 1.0);
        assert_close(fit.chi_squared, 1.0);
    }

    #[rstest]
    fn test_single_point_line() {
        let fit = fit_line(&[5.0], &[7.0], 0.3).unwrap();
        assert_eq!(fit.a, 7.0);
        assert_eq!(fit.a_sigma, 0.3);
        assert_eq!(fit.b, 0.0);
        assert!(fit.b_sigma.is_nan());
    }

    #[rstest]
    fn test_degenerate_inputs_are_nan() {
        assert!(fit_line(&[], &[], 1.0).unwrap().a.is_nan());
        let fit = fit_line(&[2.0, 2.0], &[1.0, 3.0], 1.0).unwrap();
        assert!(fit.b.is_nan());
    }

    #[rstest]
    fn test_range_fits_match_slices() {
        let x: Vec<f64> = (0..20).map(|i| i as f64 * 0.1).collect();
        let y: Vec<f64> = x.iter().map(|v| (v * 3.0).sin()).collect();
        let fits = CumulativeFits::new(&x, &y, 0.2);
        let from_prefix = fits.line(5, 13);
        let direct = fit_line(&x[5..13], &y[5..13], 0.2).unwrap();
        assert_close(from_prefix.a, direct.a);
        assert_close(from_prefix.b, direct.b);
        assert_close(from_prefix.a_sigma, direct.a_sigma);
        assert_close(from_prefix.chi_squared, direct.chi_squared);
    }

    #[rstest]
    #[case(0.0)]
    #[case(-1.0)]
    #[case(f64::NAN)]
    fn test_rejects_bad_sigma(#[case] sigma: f64) {
        assert!(matches!(
            fit_line(&[0.0, 1.0], &[0.0, 1.0], sigma),
            Err(KcpError::NonPositiveSigma(_))
        ));
    }

    #[rstest]
    fn test_rejects_mismatched_lengths() {
        assert!(matches!(
            fit_mean(&[0.0, 1.0], &[0.0], 1.0),
            Err(KcpError::MismatchedLengths(2, 1))
        ));
    }
}
