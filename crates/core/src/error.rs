use std::path::PathBuf;

use thiserror::Error;

/// Errors that stop a batch before any item is processed.
///
/// Per-item problems (lookup misses, backend rejections, a single failed
/// write) never surface here; they are recorded in the batch report instead.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("input file not found: {0:?}")]
    MissingInput(PathBuf),
    #[error("directory not found: {0:?}")]
    MissingDirectory(PathBuf),
    #[error("mapping file {path:?} must contain '{hexcode}' and '{label}' columns (found: {found:?})")]
    MissingColumns {
        path: PathBuf,
        hexcode: String,
        label: String,
        found: Vec<String>,
    },
    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, BatchError>;
