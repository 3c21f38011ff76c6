//! The Levenberg-Marquardt loop.
//!
//! Each iteration builds the normal equations `JᵀWJ · δ = JᵀW(y - f)` over the free parameters,
//! damps the diagonal with `(1 + λ)`, solves by Gauss-Jordan and keeps the step only if
//! chi-squared went down. Accepted steps divide λ by `factor`, rejected ones multiply it.
//!
//! An ill-conditioned system produces NaN steps; those never lower chi-squared, so the loop
//! simply runs out its iteration budget and returns the last good parameters.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::LmError;
use crate::gauss_jordan::{Matrix, invert, solve_vector};
use crate::models::{LinearModel, ModelFunction};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LmOptions {
    /// Stop once an accepted step lowers chi-squared by no more than this.
    pub precision: f64,
    pub max_iterations: usize,
    /// Initial damping.
    pub lambda: f64,
    /// Multiplier applied to λ after each rejected step (and divisor after each accepted one).
    pub factor: f64,
    /// Also estimate parameter standard deviations.
    pub standard_deviations: bool,
}

impl Default for LmOptions {
    fn default() -> Self {
        Self {
            precision: 1e-6,
            max_iterations: 50,
            lambda: 1e-3,
            factor: 10.0,
            standard_deviations: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitResult {
    pub parameters: Vec<f64>,
    pub chi_squared: f64,
    pub iterations: usize,
    /// Zero for held parameters; `None` unless requested in [`LmOptions`].
    pub standard_deviations: Option<Vec<f64>>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LevenbergMarquardt {
    options: LmOptions,
}

impl LevenbergMarquardt {
    pub fn new(options: LmOptions) -> Self {
        LevenbergMarquardt { options }
    }

    pub fn options(&self) -> &LmOptions {
        &self.options
    }

    ///
    /// Fit `model` to the points `(x[i], y[i])`.
    ///
    /// Free parameters (where `vary[k]` is true) are updated in place in `p`; the others are
    /// left untouched. When `sigma` is given, residuals are weighted by `1/sigma[i]²`.
    ///
    /// # Arguments
    /// - model: the function to fit
    /// - x: input vector of each data point
    /// - y: observed value of each data point
    /// - sigma: optional per-point measurement uncertainty
    /// - p: initial guess, overwritten with the fitted parameters
    /// - vary: mask of free parameters
    ///
    pub fn solve<M: ModelFunction + ?Sized>(
        &self,
        model: &M,
        x: &[Vec<f64>],
        y: &[f64],
        sigma: Option<&[f64]>,
        p: &mut [f64],
        vary: &[bool],
    ) -> Result<FitResult, LmError> {
        validate(model, x, y, sigma, p, vary)?;

        let free: Vec<usize> = (0..p.len()).filter(|&k| vary[k]).collect();
        let mut chi_squared = weighted_chi_squared(model, x, y, sigma, p);
        let mut lambda = self.options.lambda;
        let mut iterations = 0;

        while !free.is_empty() && iterations < self.options.max_iterations {
            iterations += 1;

            let (mut alpha, beta) = normal_equations(model, x, y, sigma, p, &free);
            for (k, row) in alpha.iter_mut().enumerate() {
                row[k] *= 1.0 + lambda;
            }
            let delta = solve_vector(&alpha, &beta)?;

            let mut trial = p.to_vec();
            for (&k, step) in free.iter().zip(&delta) {
                trial[k] += step;
            }
            let trial_chi_squared = weighted_chi_squared(model, x, y, sigma, &trial);

            if trial_chi_squared < chi_squared {
                let improvement = chi_squared - trial_chi_squared;
                p.copy_from_slice(&trial);
                chi_squared = trial_chi_squared;
                lambda /= self.options.factor;
                if improvement <= self.options.precision || chi_squared == 0.0 {
                    break;
                }
            } else {
                lambda *= self.options.factor;
            }
        }

        debug!(
            "LM finished after {} iterations, chi2 = {}, lambda = {}",
            iterations, chi_squared, lambda
        );

        let standard_deviations = if self.options.standard_deviations {
            Some(standard_deviations(model, x, y, sigma, p, &free, chi_squared)?)
        } else {
            None
        };

        Ok(FitResult {
            parameters: p.to_vec(),
            chi_squared,
            iterations,
            standard_deviations,
        })
    }
}

///
/// Fit `a + b·x` through the generic engine. Agrees with the closed-form regression the
/// change-point search uses, at a much higher cost.
///
pub fn fit_linear_lm(x: &[f64], y: &[f64], sigma: Option<&[f64]>) -> Result<FitResult, LmError> {
    let inputs: Vec<Vec<f64>> = x.iter().map(|v| vec![*v]).collect();
    let mut p = vec![y.first().copied().unwrap_or(0.0), 0.0];
    let options = LmOptions {
        precision: 1e-12,
        max_iterations: 200,
        ..LmOptions::default()
    };
    LevenbergMarquardt::new(options).solve(&LinearModel, &inputs, y, sigma, &mut p, &[true, true])
}

fn validate<M: ModelFunction + ?Sized>(
    model: &M,
    x: &[Vec<f64>],
    y: &[f64],
    sigma: Option<&[f64]>,
    p: &[f64],
    vary: &[bool],
) -> Result<(), LmError> {
    if x.len() != y.len() {
        return Err(LmError::MismatchedLengths(x.len(), y.len()));
    }
    if y.is_empty() {
        return Err(LmError::EmptyData);
    }
    if p.len() != model.n_parameters() {
        return Err(LmError::ParameterCountMismatch {
            expected: model.n_parameters(),
            found: p.len(),
        });
    }
    if vary.len() != p.len() {
        return Err(LmError::VaryMaskLength {
            expected: p.len(),
            found: vary.len(),
        });
    }
    if let Some(sigma) = sigma {
        if sigma.len() != y.len() {
            return Err(LmError::SigmaLength {
                expected: y.len(),
                found: sigma.len(),
            });
        }
        if let Some(bad) = sigma.iter().find(|s| !(**s > 0.0 && s.is_finite())) {
            return Err(LmError::NonPositiveSigma(*bad));
        }
    }
    Ok(())
}

fn weight(sigma: Option<&[f64]>, i: usize) -> f64 {
    match sigma {
        Some(sigma) => 1.0 / (sigma[i] * sigma[i]),
        None => 1.0,
    }
}

fn weighted_chi_squared<M: ModelFunction + ?Sized>(
    model: &M,
    x: &[Vec<f64>],
    y: &[f64],
    sigma: Option<&[f64]>,
    p: &[f64],
) -> f64 {
    x.iter()
        .zip(y)
        .enumerate()
        .map(|(i, (xi, yi))| {
            let residual = yi - model.value(xi, p);
            residual * residual * weight(sigma, i)
        })
        .sum()
}

/// Builds `alpha = JᵀWJ` and `beta = JᵀW(y - f)` restricted to the free parameters.
fn normal_equations<M: ModelFunction + ?Sized>(
    model: &M,
    x: &[Vec<f64>],
    y: &[f64],
    sigma: Option<&[f64]>,
    p: &[f64],
    free: &[usize],
) -> (Matrix, Vec<f64>) {
    let m = free.len();
    let mut alpha = vec![vec![0.0; m]; m];
    let mut beta = vec![0.0; m];
    let mut gradient = vec![0.0; p.len()];

    for (i, (xi, yi)) in x.iter().zip(y).enumerate() {
        model.derivatives(xi, p, &mut gradient);
        let w = weight(sigma, i);
        let residual = yi - model.value(xi, p);
        for (row, &k) in free.iter().enumerate() {
            let wk = gradient[k] * w;
            beta[row] += residual * wk;
            for (col, &l) in free.iter().enumerate().take(row + 1) {
                alpha[row][col] += wk * gradient[l];
            }
        }
    }

    // mirror the lower triangle
    for row in 0..m {
        for col in (row + 1)..m {
            alpha[row][col] = alpha[col][row];
        }
    }

    (alpha, beta)
}

///
/// `sqrt(diag((JᵀWJ)⁻¹) · χ²/(n - m))` for the free parameters, zero for held ones.
///
fn standard_deviations<M: ModelFunction + ?Sized>(
    model: &M,
    x: &[Vec<f64>],
    y: &[f64],
    sigma: Option<&[f64]>,
    p: &[f64],
    free: &[usize],
    chi_squared: f64,
) -> Result<Vec<f64>, LmError> {
    let mut result = vec![0.0; p.len()];
    if free.is_empty() {
        return Ok(result);
    }
    let (alpha, _) = normal_equations(model, x, y, sigma, p, free);
    let covariance = invert(&alpha)?;
    let reduced_chi_squared = chi_squared / (y.len() as f64 - free.len() as f64);
    for (row, &k) in free.iter().enumerate() {
        result[k] = (covariance[row][row] * reduced_chi_squared).sqrt();
    }
    Ok(result)
}
