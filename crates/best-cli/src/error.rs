//! Error types for the command-line interface.

use best::BestError;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

/// Result type alias for CLI operations
pub(crate) type Result<T> = std::result::Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug)]
pub(crate) enum CliError {
    /// Input file does not exist
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// A value in an input file is not a number
    #[error("Invalid data in {path} at line {line}: {message}")]
    InvalidData {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// Requested column is not in the CSV header
    #[error("Column '{column}' not found (available: {available})")]
    MissingColumn { column: String, available: String },

    /// CSV is malformed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Report could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Analysis failed
    #[error("{0}")]
    Best(#[from] BestError),
}

impl CliError {
    /// Get exit code for this error
    pub(crate) fn exit_code(&self) -> ExitCode {
        match self {
            Self::FileNotFound(_) => ExitCode::from(3),
            Self::InvalidData { .. } | Self::MissingColumn { .. } | Self::Csv(_) => {
                ExitCode::from(4)
            }
            Self::Best(BestError::InvalidInput(_) | BestError::EmptyInput(_)) => {
                ExitCode::from(4)
            }
            Self::Serialization(_) | Self::Best(BestError::Serialization(_)) => {
                ExitCode::from(5)
            }
            Self::Io(_) | Self::Best(BestError::Io(_)) => ExitCode::from(7),
            Self::Best(_) => ExitCode::from(1),
        }
    }
}
