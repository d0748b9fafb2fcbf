//! CSV loading for the incidence time series.
//!
//! The file starts with a header record that is skipped unread. Every other
//! record is split on `,` with quoting disabled and turned into a [`Record`].
//! Records with fewer than [`FIELD_COUNT`] fields are ignored; records with
//! enough fields that fail to parse are handled according to the caller's
//! [`RowPolicy`].

use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use covid_core::error::{AnalyzerError, Result};
use covid_core::models::{LoadSummary, Record, RecordSet, RowPolicy};
use csv::StringRecord;
use tracing::{debug, info, warn};

/// Minimum number of comma-separated fields in a data line.
pub const FIELD_COUNT: usize = 7;

/// Date format of the first column.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ── Public API ────────────────────────────────────────────────────────────────

/// Load every record from the CSV file at `path`.
///
/// An unreadable file yields [`AnalyzerError::FileRead`]; a bad row yields
/// [`AnalyzerError::RowParse`] under [`RowPolicy::Abort`].
pub fn load_records(path: &Path, policy: RowPolicy) -> Result<(RecordSet, LoadSummary)> {
    let file = std::fs::File::open(path).map_err(|source| AnalyzerError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let (records, summary) = read_records(file, policy).map_err(|e| match e {
        AnalyzerError::Io(source) => AnalyzerError::FileRead {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })?;

    info!(
        "Loaded {} records from {}",
        summary.records_loaded,
        path.display()
    );

    Ok((records, summary))
}

/// Parse records from any reader. The first record is the header.
///
/// Blank lines are not records and are not counted.
pub fn read_records<R: Read>(reader: R, policy: RowPolicy) -> Result<(RecordSet, LoadSummary)> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .from_reader(reader);

    let mut records: Vec<Record> = Vec::new();
    let mut summary = LoadSummary::default();

    for result in csv_reader.records() {
        summary.lines_read += 1;

        let parsed = match result {
            Ok(row) if row.len() < FIELD_COUNT => {
                summary.short_lines += 1;
                continue;
            }
            Ok(row) => parse_fields(&row, line_of(&row)),
            Err(e) => Err(csv_error(e)),
        };

        match parsed {
            Ok(record) => records.push(record),
            Err(e) if policy == RowPolicy::Skip && e.is_row_error() => {
                warn!("Skipping row: {}", e);
                summary.invalid_rows += 1;
            }
            Err(e) => return Err(e),
        }
    }

    summary.records_loaded = records.len();

    debug!(
        "{} lines read, {} loaded, {} short, {} invalid",
        summary.lines_read, summary.records_loaded, summary.short_lines, summary.invalid_rows,
    );

    Ok((RecordSet::new(records), summary))
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn parse_fields(row: &StringRecord, line: usize) -> Result<Record> {
    Ok(Record {
        report_date: parse_date(&row[0], line)?,
        age_group: row[1].to_string(),
        population: parse_int(&row[2], line, "population")?,
        cases_total: parse_int(&row[3], line, "cases_total")?,
        cases_new: parse_int(&row[4], line, "cases_new")?,
        cases_7day: parse_int(&row[5], line, "cases_7day")?,
        incidence_7day: parse_incidence(&row[6], line)?,
    })
}

/// 1-based line of the record in the file, header included.
fn line_of(row: &StringRecord) -> usize {
    row.position().map_or(0, |pos| pos.line() as usize)
}

/// Only the zero-padded `YYYY-MM-DD` form is a date; chrono alone also
/// accepts `2021-1-1`, a leading sign or surrounding blanks.
fn parse_date(raw: &str, line: usize) -> Result<NaiveDate> {
    if !is_iso_date(raw) {
        return Err(row_error(line, "date", raw, "expected YYYY-MM-DD"));
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| row_error(line, "date", raw, e))
}

fn is_iso_date(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

fn parse_int<T>(raw: &str, line: usize, field: &'static str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| row_error(line, field, raw, e))
}

/// `f64::from_str` always uses `.` as the radix, independent of the locale.
fn parse_incidence(raw: &str, line: usize) -> Result<f64> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|e| row_error(line, "incidence_7day", raw, e))?;

    if !value.is_finite() {
        return Err(row_error(line, "incidence_7day", raw, "value is not finite"));
    }
    if value < 0.0 {
        return Err(row_error(line, "incidence_7day", raw, "value is negative"));
    }
    Ok(value)
}

fn row_error(
    line: usize,
    field: &'static str,
    raw: &str,
    reason: impl std::fmt::Display,
) -> AnalyzerError {
    AnalyzerError::RowParse {
        line,
        field,
        value: raw.to_string(),
        reason: reason.to_string(),
    }
}

/// Read failures stay I/O errors; anything else is confined to one row.
fn csv_error(err: csv::Error) -> AnalyzerError {
    let line = err.position().map_or(0, |pos| pos.line() as usize);
    let reason = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(source) => AnalyzerError::Io(source),
        _ => AnalyzerError::MalformedRow { line, reason },
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
