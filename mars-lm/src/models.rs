//! Model functions the solver can fit.
//!
//! A model maps an input vector `x` and a parameter vector `p` to one scalar. Models that know
//! their analytic derivatives override [`ModelFunction::derivatives`]; the rest fall back to
//! central finite differences.

/// Step used for numerical derivatives with respect to parameters.
pub const DELTA_PARAMETER: f64 = 1e-6;

pub trait ModelFunction: Sync {
    fn n_parameters(&self) -> usize;

    fn value(&self, x: &[f64], p: &[f64]) -> f64;

    /// Write `∂f/∂p_k` at `(x, p)` into `out[k]`.
    fn derivatives(&self, x: &[f64], p: &[f64], out: &mut [f64]) {
        numeric_derivatives(self, x, p, out);
    }
}

///
/// Central-difference estimate of the parameter gradient of `model` at `(x, p)`.
///
pub fn numeric_derivatives<M: ModelFunction + ?Sized>(
    model: &M,
    x: &[f64],
    p: &[f64],
    out: &mut [f64],
) {
    let mut shifted = p.to_vec();
    for (k, derivative) in out.iter_mut().enumerate().take(p.len()) {
        let original = shifted[k];
        shifted[k] = original + DELTA_PARAMETER;
        let upper = model.value(x, &shifted);
        shifted[k] = original - DELTA_PARAMETER;
        let lower = model.value(x, &shifted);
        shifted[k] = original;
        *derivative = (upper - lower) / (2.0 * DELTA_PARAMETER);
    }
}

/// `a + b·x`, parameters `[a, b]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearModel;

impl ModelFunction for LinearModel {
    fn n_parameters(&self) -> usize {
        2
    }

    fn value(&self, x: &[f64], p: &[f64]) -> f64 {
        p[0] + p[1] * x[0]
    }

    fn derivatives(&self, x: &[f64], _p: &[f64], out: &mut [f64]) {
        out[0] = 1.0;
        out[1] = x[0];
    }
}

/// `a + b·exp(-(x-c)²/2d²)`, parameters `[a, b, c, d]`: a peak on a constant baseline.
#[derive(Debug, Clone, Copy, Default)]
pub struct GaussianPeakModel;

impl ModelFunction for GaussianPeakModel {
    fn n_parameters(&self) -> usize {
        4
    }

    fn value(&self, x: &[f64], p: &[f64]) -> f64 {
        let dx = x[0] - p[2];
        p[0] + p[1] * (-(dx * dx) / (2.0 * p[3] * p[3])).exp()
    }
}

/// `a + b·exp(-x/c)`, parameters `[a, b, c]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExponentialDecayModel;

impl ModelFunction for ExponentialDecayModel {
    fn n_parameters(&self) -> usize {
        3
    }

    fn value(&self, x: &[f64], p: &[f64]) -> f64 {
        p[0] + p[1] * (-x[0] / p[2]).exp()
    }

    fn derivatives(&self, x: &[f64], p: &[f64], out: &mut [f64]) {
        let decay = (-x[0] / p[2]).exp();
        out[0] = 1.0;
        out[1] = decay;
        out[2] = p[1] * decay * x[0] / (p[2] * p[2]);
    }
}

///
/// Symmetric 2D peak over `x = [x, y]`, parameters `[baseline, height, x0, y0, sigma]`.
///
#[derive(Debug, Clone, Copy, Default)]
pub struct Gaussian2dModel;

impl ModelFunction for Gaussian2dModel {
    fn n_parameters(&self) -> usize {
        5
    }

    fn value(&self, x: &[f64], p: &[f64]) -> f64 {
        let dx = x[0] - p[2];
        let dy = x[1] - p[3];
        p[0] + p[1] * (-(dx * dx + dy * dy) / (2.0 * p[4] * p[4])).exp()
    }

    fn derivatives(&self, x: &[f64], p: &[f64], out: &mut [f64]) {
        let dx = x[0] - p[2];
        let dy = x[1] - p[3];
        let s2 = p[4] * p[4];
        let peak = (-(dx * dx + dy * dy) / (2.0 * s2)).exp();
        out[0] = 1.0;
        out[1] = peak;
        out[2] = p[1] * peak * dx / s2;
        out[3] = p[1] * peak * dy / s2;
        out[4] = p[1] * peak * (dx * dx + dy * dy) / (s2 * p[4]);
    }
}
