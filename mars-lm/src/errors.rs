use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum LmError {
    #[error("x and y have mismatched lengths: {0} != {1}")]
    MismatchedLengths(usize, usize),

    #[error("sigma has {found} values but there are {expected} data points")]
    SigmaLength { expected: usize, found: usize },

    #[error("Sigma must be positive and finite, got {0}")]
    NonPositiveSigma(f64),

    #[error("Model takes {expected} parameters, got {found}")]
    ParameterCountMismatch { expected: usize, found: usize },

    #[error("vary mask has {found} entries for {expected} parameters")]
    VaryMaskLength { expected: usize, found: usize },

    #[error("No data points to fit")]
    EmptyData,

    #[error("Matrix must be square, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    #[error("Right-hand side has {found} rows, expected {expected}")]
    DimensionMismatch { expected: usize, found: usize },
}
