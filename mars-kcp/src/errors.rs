use mars_core::MarsCoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KcpError {
    #[error("x and y have mismatched lengths: {0} != {1}")]
    MismatchedLengths(usize, usize),

    #[error("Sigma must be positive and finite, got {0}")]
    NonPositiveSigma(f64),

    #[error("Confidence level must lie strictly between 0 and 1, got {0}")]
    InvalidConfidenceLevel(f64),

    #[error("Range [{start}, {end}) does not fit a trace of {len} samples")]
    InvalidRange { start: usize, end: usize, len: usize },

    #[error("Could not derive the split threshold: {0}")]
    Threshold(String),

    #[error("{failed} of {total} molecules failed; first failure: {first}")]
    BatchFailed {
        failed: usize,
        total: usize,
        first: Box<KcpError>,
    },

    #[error(transparent)]
    Core(#[from] MarsCoreError),

    #[error(transparent)]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
