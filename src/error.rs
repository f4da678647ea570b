//! Dataset loading and column access errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("dataset has no header row")]
    Empty,

    #[error("column not found: {0}")]
    MissingColumn(String),

    #[error("invalid number in column '{column}' at row {row}: {value:?}")]
    InvalidNumber {
        column: String,
        row: usize,
        value: String,
    },
}

pub type DatasetResult<T> = Result<T, DatasetError>;
