//! Shared building blocks for the COVID incidence analyzer.
//!
//! Holds the record model, the error taxonomy, text formatting helpers and
//! the command-line settings used by the loader, the report engine and the
//! binary.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;

pub use error::{AnalyzerError, Result};
pub use models::{LoadSummary, Record, RecordSet, ReportKind, RowPolicy};
