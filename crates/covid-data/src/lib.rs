//! Data layer for the COVID incidence analyzer.
//!
//! Responsible for reading the incidence CSV into an immutable record set,
//! aggregating it by month, and rendering the text reports.

pub mod aggregator;
pub mod reader;
pub mod reports;
