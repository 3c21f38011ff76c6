use serde::{Deserialize, Serialize};

use crate::errors::MarsCoreError;
use crate::utils::nan_as_null;

/// Column names of a stored segment table, in row order.
///
/// Existing archives rely on exactly these names.
pub const SEGMENT_COLUMNS: [&str; 8] = ["x1", "y1", "x2", "y2", "A", "sigma_A", "B", "sigma_B"];

/// Extra column present when segments from several molecules are pooled.
pub const UID_COLUMN: &str = "UID";

///
/// One piecewise-linear fit region of a trace.
///
/// `a` is the intercept and `b` the slope (the "rate"), both with their standard errors.
/// A segment whose fit fields are all NaN is the "no valid region" sentinel, see [`Segment::nan`].
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    #[serde(with = "nan_as_null")]
    pub x1: f64,
    #[serde(with = "nan_as_null")]
    pub y1: f64,
    #[serde(with = "nan_as_null")]
    pub x2: f64,
    #[serde(with = "nan_as_null")]
    pub y2: f64,
    #[serde(rename = "A", with = "nan_as_null")]
    pub a: f64,
    #[serde(rename = "sigma_A", with = "nan_as_null")]
    pub a_sigma: f64,
    #[serde(rename = "B", with = "nan_as_null")]
    pub b: f64,
    #[serde(rename = "sigma_B", with = "nan_as_null")]
    pub b_sigma: f64,
    #[serde(rename = "UID", default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

impl Segment {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        a: f64,
        a_sigma: f64,
        b: f64,
        b_sigma: f64,
    ) -> Self {
        Segment {
            x1,
            y1,
            x2,
            y2,
            a,
            a_sigma,
            b,
            b_sigma,
            uid: None,
        }
    }

    ///
    /// The all-NaN segment returned when a range holds no data to analyze.
    ///
    pub fn nan() -> Self {
        Segment::new(
            f64::NAN,
            f64::NAN,
            f64::NAN,
            f64::NAN,
            f64::NAN,
            f64::NAN,
            f64::NAN,
            f64::NAN,
        )
    }

    /// True when none of the fit fields is NaN.
    pub fn is_valid(&self) -> bool {
        self.to_row().iter().all(|v| !v.is_nan())
    }

    /// Extent of the segment along x.
    pub fn duration(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    ///
    /// Values in [`SEGMENT_COLUMNS`] order.
    ///
    pub fn to_row(&self) -> [f64; 8] {
        [
            self.x1,
            self.y1,
            self.x2,
            self.y2,
            self.a,
            self.a_sigma,
            self.b,
            self.b_sigma,
        ]
    }

    ///
    /// Build a segment from values in [`SEGMENT_COLUMNS`] order.
    ///
    pub fn from_row(row: &[f64]) -> Result<Self, MarsCoreError> {
        if row.len() != SEGMENT_COLUMNS.len() {
            return Err(MarsCoreError::InvalidSegmentRow {
                expected: SEGMENT_COLUMNS.len(),
                found: row.len(),
            });
        }
        Ok(Segment::new(
            row[0], row[1], row[2], row[3], row[4], row[5], row[6], row[7],
        ))
    }
}

///
/// Check that consecutive segments share their boundary: `x2[i] == x1[i+1]`.
///
pub fn is_contiguous(segments: &[Segment]) -> bool {
    segments.windows(2).all(|w| w[0].x2 == w[1].x1)
}

///
/// Conventional name of the segment table computed from column `x_column` against `y_column`,
/// optionally restricted to a named region.
///
pub fn segment_table_name(x_column: &str, y_column: &str, region: Option<&str>) -> String {
    match region {
        Some(region) => format!("{} vs {} - {}", x_column, y_column, region),
        None => format!("{} vs {}", x_column, y_column),
    }
}
