use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("unsupported dataset format: {0:?}")]
    UnsupportedInput(PathBuf),
    #[error("dataset is missing required column {0:?}")]
    MissingColumn(&'static str),
    #[error("invalid value {value:?} in column {column:?} at row {row}")]
    InvalidCell {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("dataset contains no usable quote records")]
    EmptyDataset,
    #[error("no quote records to average")]
    NoMatches,
    #[error("origin not recognized: {0}")]
    UnknownOrigin(String),
    #[error("distance must be finite and non-negative, got {0}")]
    InvalidDistance(f64),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl QuoteError {
    /// Caller-side input problems, as opposed to dataset or environment failures.
    pub fn is_rejected_input(&self) -> bool {
        matches!(
            self,
            QuoteError::UnknownOrigin(_) | QuoteError::InvalidDistance(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, QuoteError>;
