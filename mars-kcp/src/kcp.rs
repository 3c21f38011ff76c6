//! Recursive change point search.
//!
//! A range of samples is fitted by one line. Every interior split point is tried and the one that
//! lowers chi-squared the most is kept if that reduction beats the chi-squared quantile at the
//! requested confidence level (one degree of freedom). Accepted splits are searched again on both
//! sides until no range can be split further.

use statrs::distribution::{ChiSquared, ContinuousCDF};

use mars_core::models::Segment;

use crate::errors::KcpError;
use crate::regression::{CumulativeFits, LineFit, validate};

/// Smallest range that still gets a line fit of its own.
pub const MIN_POINTS_LINE: usize = 2;
/// Smallest range that still gets a level fit of its own.
pub const MIN_POINTS_STEP: usize = 1;

///
/// Configured change point search for traces sharing one noise level.
///
/// The search holds no mutable state, so one value can serve any number of threads.
///
#[derive(Debug, Clone)]
pub struct ChangePointSearch {
    sigma: f64,
    confidence_level: f64,
    step_analysis: bool,
    threshold: f64,
}

impl ChangePointSearch {
    ///
    /// Create a search.
    ///
    /// # Arguments
    /// - sigma: noise level of a single sample, must be positive
    /// - confidence_level: probability in (0, 1), e.g. 0.99
    /// - step_analysis: fit flat levels instead of sloped lines
    ///
    pub fn new(sigma: f64, confidence_level: f64, step_analysis: bool) -> Result<Self, KcpError> {
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(KcpError::NonPositiveSigma(sigma));
        }
        if !(confidence_level > 0.0 && confidence_level < 1.0) {
            return Err(KcpError::InvalidConfidenceLevel(confidence_level));
        }
        let distribution =
            ChiSquared::new(1.0).map_err(|e| KcpError::Threshold(e.to_string()))?;
        let threshold = distribution.inverse_cdf(confidence_level);

        Ok(ChangePointSearch {
            sigma,
            confidence_level,
            step_analysis,
            threshold,
        })
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    pub fn confidence_level(&self) -> f64 {
        self.confidence_level
    }

    pub fn step_analysis(&self) -> bool {
        self.step_analysis
    }

    /// Chi-squared reduction a split must exceed to be accepted.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    fn min_points(&self) -> usize {
        if self.step_analysis {
            MIN_POINTS_STEP
        } else {
            MIN_POINTS_LINE
        }
    }

    ///
    /// Split `x[offset..offset + length]` / `y[offset..offset + length]` into segments.
    ///
    /// Samples where either value is NaN are dropped first. With nothing left the result is the
    /// single all-NaN segment. Otherwise the segments are ordered and contiguous: each one ends at
    /// the x where the next begins and the last ends at the last remaining sample.
    ///
    pub fn generate_segments(
        &self,
        x: &[f64],
        y: &[f64],
        offset: usize,
        length: usize,
    ) -> Result<Vec<Segment>, KcpError> {
        validate(x, y, self.sigma)?;
        let end = offset.saturating_add(length);
        if end > x.len() {
            return Err(KcpError::InvalidRange {
                start: offset,
                end,
                len: x.len(),
            });
        }

        let (xs, ys): (Vec<f64>, Vec<f64>) = x[offset..end]
            .iter()
            .zip(&y[offset..end])
            .filter(|(xi, yi)| !xi.is_nan() && !yi.is_nan())
            .map(|(xi, yi)| (*xi, *yi))
            .unzip();
        if xs.is_empty() {
            return Ok(vec![Segment::nan()]);
        }

        let fits = CumulativeFits::new(&xs, &ys, self.sigma);
        Ok(self
            .partition(&fits)
            .into_iter()
            .map(|(lo, hi)| {
                let fit = fits.fit(lo, hi, self.step_analysis);
                let x1 = xs[lo];
                let x2 = if hi < xs.len() { xs[hi] } else { xs[xs.len() - 1] };
                to_segment(&fit, x1, x2)
            })
            .collect())
    }

    /// Index ranges of the final segments, in order.
    fn partition(&self, fits: &CumulativeFits) -> Vec<(usize, usize)> {
        let mut ranges = Vec::new();
        // ranges still to examine; the top of the stack is always the leftmost
        let mut pending = vec![(0, fits.len())];
        while let Some((lo, hi)) = pending.pop() {
            match self.best_split(fits, lo, hi) {
                Some(split) => {
                    pending.push((split, hi));
                    pending.push((lo, split));
                }
                None => ranges.push((lo, hi)),
            }
        }
        ranges
    }

    /// Split point with the largest chi-squared reduction, if it is significant.
    fn best_split(&self, fits: &CumulativeFits, lo: usize, hi: usize) -> Option<usize> {
        let min = self.min_points();
        if hi - lo < 2 * min {
            return None;
        }

        let whole = fits.fit(lo, hi, self.step_analysis).chi_squared;
        let mut best: Option<(usize, f64)> = None;
        for split in (lo + min)..=(hi - min) {
            let left = fits.fit(lo, split, self.step_analysis).chi_squared;
            let right = fits.fit(split, hi, self.step_analysis).chi_squared;
            let improvement = whole - left - right;
            if improvement.is_nan() {
                continue;
            }
            if best.is_none_or(|(_, value)| improvement > value) {
                best = Some((split, improvement));
            }
        }

        best.filter(|(_, improvement)| *improvement > self.threshold)
            .map(|(split, _)| split)
    }
}

fn to_segment(fit: &LineFit, x1: f64, x2: f64) -> Segment {
    Segment::new(
        x1,
        fit.at(x1),
        x2,
        fit.at(x2),
        fit.a,
        fit.a_sigma,
        fit.b,
        fit.b_sigma,
    )
}

///
/// Sample standard deviation of `y[start..end]`, skipping NaN values.
///
/// Used to estimate the noise level from a flat stretch of background. Fewer than two usable
/// samples give NaN.
///
pub fn calc_sigma(y: &[f64], start: usize, end: usize) -> Result<f64, KcpError> {
    if start > end || end > y.len() {
        return Err(KcpError::InvalidRange {
            start,
            end,
            len: y.len(),
        });
    }
    Ok(sample_std(y[start..end].iter().copied().filter(|v| !v.is_nan())))
}

///
/// Like [`calc_sigma`], with the background region given in x units, `x_start <= x <= x_end`.
///
pub fn calc_sigma_by_x(x: &[f64], y: &[f64], x_start: f64, x_end: f64) -> Result<f64, KcpError> {
    if x.len() != y.len() {
        return Err(KcpError::MismatchedLengths(x.len(), y.len()));
    }
    Ok(sample_std(
        x.iter()
            .zip(y)
            .filter(|(xi, yi)| **xi >= x_start && **xi <= x_end && !yi.is_nan())
            .map(|(_, yi)| *yi),
    ))
}

fn sample_std(values: impl Iterator<Item = f64>) -> f64 {
    let values: Vec<f64> = values.collect();
    if values.len() < 2 {
        return f64::NAN;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let squares: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    (squares / (n - 1.0)).sqrt()
}
