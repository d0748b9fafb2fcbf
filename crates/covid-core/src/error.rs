use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the COVID analyzer.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// The input file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A data row was accepted (enough fields) but one of its fields did not parse.
    #[error("Invalid {field} '{value}' on line {line}: {reason}")]
    RowParse {
        line: usize,
        field: &'static str,
        value: String,
        reason: String,
    },

    /// A report needs at least one record but the record set is empty.
    #[error("No data loaded: the maximum incidence is undefined")]
    NoData,

    /// A report could not be written to disk.
    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A report name or menu choice is not recognised.
    #[error("Invalid report: {0}")]
    InvalidReport(String),

    /// A data row could not be decoded at all, e.g. it is not valid UTF-8.
    #[error("Malformed row on line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AnalyzerError {
    /// `true` for errors confined to one data row, which the skip policy may drop.
    pub fn is_row_error(&self) -> bool {
        matches!(
            self,
            AnalyzerError::RowParse { .. } | AnalyzerError::MalformedRow { .. }
        )
    }
}

/// Convenience alias used throughout the analyzer crates.
pub type Result<T> = std::result::Result<T, AnalyzerError>;
