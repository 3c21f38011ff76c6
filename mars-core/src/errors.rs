use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarsCoreError {
    #[error("Sigma must be positive and finite, got {0}")]
    NonPositiveSigma(f64),

    #[error("Molecule not found in archive: {0}")]
    MoleculeNotFound(String),

    #[error("Column '{column}' not found for molecule {uid}")]
    ColumnNotFound { uid: String, column: String },

    #[error("Columns have mismatched lengths: {0} != {1}")]
    MismatchedLengths(usize, usize),

    #[error("Segment row must have {expected} values, got {found}")]
    InvalidSegmentRow { expected: usize, found: usize },

    #[error("Archive lock was poisoned by a panicking writer")]
    LockPoisoned,

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
