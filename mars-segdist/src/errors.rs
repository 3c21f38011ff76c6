use mars_core::MarsCoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SegmentDistributionError {
    #[error("Bin count must be at least 1")]
    InvalidBins,

    #[error("Binning range must be finite with start < end, got [{0}, {1})")]
    InvalidRange(f64, f64),

    #[error("Slope filter must satisfy start <= stop, got [{0}, {1}]")]
    InvalidFilter(f64, f64),

    #[error("Bootstrapping needs at least 2 cycles, got {0}")]
    InvalidBootstrapCycles(usize),

    #[error(transparent)]
    Core(#[from] MarsCoreError),

    #[error(transparent)]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
