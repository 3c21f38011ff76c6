use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::{Deserialize, Serialize};

use mars_core::utils::nan_values;

use crate::errors::SegmentDistributionError;

pub const RATE_COLUMN: &str = "Rate";
pub const DURATION_COLUMN: &str = "Duration";
pub const PROCESSIVITY_COLUMN: &str = "Processivity";
pub const OCCURRENCES_COLUMN: &str = "Occurrences";
pub const PROBABILITY_COLUMN: &str = "Probability";
pub const PROBABILITY_DENSITY_COLUMN: &str = "Probability Density";
pub const BOOTSTRAP_PROBABILITY_COLUMN: &str = "Bootstrap Probability";
pub const BOOTSTRAP_PROBABILITY_STD_COLUMN: &str = "Bootstrap Probability STD";
pub const BOOTSTRAP_PROBABILITY_DENSITY_COLUMN: &str = "Bootstrap Probability Density";
pub const BOOTSTRAP_PROBABILITY_DENSITY_STD_COLUMN: &str = "Bootstrap Probability Density STD";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableColumn {
    pub name: String,
    #[serde(with = "nan_values")]
    pub values: Vec<f64>,
}

///
/// A binned distribution: one row per bin, the first column holding the bin centers.
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionTable {
    pub columns: Vec<TableColumn>,
}

impl DistributionTable {
    pub fn new(value_column: &str, centers: Vec<f64>) -> Self {
        DistributionTable {
            columns: vec![TableColumn {
                name: value_column.to_string(),
                values: centers,
            }],
        }
    }

    pub fn push_column(&mut self, name: &str, values: Vec<f64>) {
        self.columns.push(TableColumn {
            name: name.to_string(),
            values,
        });
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|column| column.name == name)
            .map(|column| column.values.as_slice())
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Name of the bin-center column.
    pub fn value_column(&self) -> &str {
        self.columns.first().map_or("", |c| c.name.as_str())
    }

    /// Number of bins.
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SegmentDistributionError> {
        let writer = BufWriter::new(File::create(path.as_ref())?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Values of one bin across all columns, in column order.
    pub fn row(&self, index: usize) -> Option<Vec<f64>> {
        if index >= self.len() {
            return None;
        }
        Some(self.columns.iter().map(|c| c.values[index]).collect())
    }
}

/// Equal-width bins over `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Binning {
    pub start: f64,
    pub end: f64,
    pub bins: usize,
}

impl Binning {
    pub fn new(start: f64, end: f64, bins: usize) -> Result<Self, SegmentDistributionError> {
        if bins == 0 {
            return Err(SegmentDistributionError::InvalidBins);
        }
        if !(start.is_finite() && end.is_finite() && start < end) {
            return Err(SegmentDistributionError::InvalidRange(start, end));
        }
        Ok(Binning { start, end, bins })
    }

    pub fn width(&self) -> f64 {
        (self.end - self.start) / self.bins as f64
    }

    /// Lower edge of bin `i`.
    pub fn edge(&self, i: usize) -> f64 {
        self.start + i as f64 * self.width()
    }

    pub fn centers(&self) -> Vec<f64> {
        let half = self.width() / 2.0;
        (0..self.bins).map(|i| self.edge(i) + half).collect()
    }

    /// Bin holding `value`, if any.
    pub fn index(&self, value: f64) -> Option<usize> {
        if !(value >= self.start && value < self.end) {
            return None;
        }
        let index = ((value - self.start) / self.width()) as usize;
        Some(index.min(self.bins - 1))
    }
}

/// Resampling applied on top of a distribution build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "mode", content = "cycles")]
pub enum BootstrapMode {
    #[default]
    None,
    /// Resample individual segments (or run events) with replacement.
    Segments(usize),
    /// Resample whole molecules with replacement.
    Molecules(usize),
}

impl BootstrapMode {
    pub fn cycles(&self) -> Option<usize> {
        match self {
            BootstrapMode::None => None,
            BootstrapMode::Segments(cycles) | BootstrapMode::Molecules(cycles) => Some(*cycles),
        }
    }
}

///
/// Settings for distribution builds, loadable from TOML.
///
/// # Example
/// ```toml
/// start = -1.0
/// end = 3.0
/// bins = 40
/// filter_start = 0.5
/// filter_stop = 2.5
/// seed = 42
/// threads = 4
///
/// [bootstrap]
/// mode = "segments"
/// cycles = 100
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistributionOptions {
    pub start: f64,
    pub end: f64,
    pub bins: usize,
    pub filter_start: Option<f64>,
    pub filter_stop: Option<f64>,
    pub bootstrap: BootstrapMode,
    pub seed: Option<u64>,
    pub threads: usize,
}

impl Default for DistributionOptions {
    fn default() -> Self {
        Self {
            start: 0.0,
            end: 1.0,
            bins: 100,
            filter_start: None,
            filter_stop: None,
            bootstrap: BootstrapMode::None,
            seed: None,
            threads: 1,
        }
    }
}

impl DistributionOptions {
    pub fn from_file(path: &Path) -> Result<Self, SegmentDistributionError> {
        let content = std::fs::read_to_string(path)?;
        let options: Self = toml::from_str(&content)?;
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_binning_edges_and_centers() {
        let binning = Binning::new(-1.0, 1.0, 4).unwrap();
        assert_eq!(binning.width(), 0.5);
        assert_eq!(binning.centers(), vec![-0.75, -0.25, 0.25, 0.75]);
        assert_eq!(binning.index(-1.0), Some(0));
        assert_eq!(binning.index(0.0), Some(2));
        assert_eq!(binning.index(0.99), Some(3));
        assert_eq!(binning.index(1.0), None);
        assert_eq!(binning.index(f64::NAN), None);
    }

    #[rstest]
    #[case(0.0, 1.0, 0)]
    #[case(1.0, 1.0, 10)]
    #[case(2.0, 1.0, 10)]
    #[case(f64::NEG_INFINITY, 1.0, 10)]
    fn test_invalid_binning(#[case] start: f64, #[case] end: f64, #[case] bins: usize) {
        assert!(Binning::new(start, end, bins).is_err());
    }

    #[rstest]
    fn test_table_columns() {
        let mut table = DistributionTable::new(RATE_COLUMN, vec![0.5, 1.5]);
        table.push_column(PROBABILITY_COLUMN, vec![0.25, 0.75]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.value_column(), "Rate");
        assert_eq!(table.column_names(), vec!["Rate", "Probability"]);
        assert_eq!(table.column(PROBABILITY_COLUMN), Some(&[0.25, 0.75][..]));
        assert_eq!(table.row(1), Some(vec![1.5, 0.75]));
        assert_eq!(table.row(2), None);
        assert!(table.column("missing").is_none());
    }

    #[rstest]
    fn test_table_json_keeps_nan() {
        let mut table = DistributionTable::new(DURATION_COLUMN, vec![1.0]);
        table.push_column(PROBABILITY_COLUMN, vec![f64::NAN]);
        let json = serde_json::to_string(&table).unwrap();
        assert!(json.contains("null"));
        let back: DistributionTable = serde_json::from_str(&json).unwrap();
        assert!(back.column(PROBABILITY_COLUMN).unwrap()[0].is_nan());
    }

    #[rstest]
    fn test_options_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("segdist.toml");
        std::fs::write(
            &path,
            "start = -1.0\nend = 3.0\nbins = 40\nseed = 7\n\n[bootstrap]\nmode = \"molecules\"\ncycles = 25\n",
        )
        .unwrap();
        let options = DistributionOptions::from_file(&path).unwrap();
        assert_eq!(options.bins, 40);
        assert_eq!(options.bootstrap, BootstrapMode::Molecules(25));
        assert_eq!(options.seed, Some(7));
        assert_eq!(options.threads, 1);
        assert_eq!(options.filter_start, None);
    }
}
