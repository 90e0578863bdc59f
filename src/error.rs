use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Failure of a single pipeline stage.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to load {}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: LoadError,
    },

    #[error("cannot compute {operation} over an empty dataset")]
    EmptyDataset { operation: &'static str },

    #[error("line {line}: invalid date {value:?}")]
    InvalidDate { line: u64, value: String },

    #[error("cannot render chart: {0}")]
    Render(String),

    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why an input table could not be turned into records.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("missing required column `{0}`")]
    MissingColumn(&'static str),

    #[error("column `{field}` is ambiguous: {candidates:?}")]
    AmbiguousColumn {
        field: &'static str,
        candidates: Vec<String>,
    },

    #[error("line {line}: column `{column}` has invalid number {value:?}")]
    InvalidNumber {
        line: u64,
        column: &'static str,
        value: String,
    },

    #[error("line {line}: negative volume {value}")]
    NegativeVolume { line: u64, value: f64 },

    #[error("line {line}: duplicate date {date} (first seen on line {first_line})")]
    DuplicateDate {
        line: u64,
        first_line: u64,
        date: NaiveDate,
    },
}

pub type PipelineResult<T> = Result<T, PipelineError>;
