use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::str::FromStr;

use crate::error::AnalyzerError;

/// One observation from the incidence time series.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Reporting date of the observation.
    pub report_date: NaiveDate,
    /// Age-band code or `"total"`, exactly as it appears in the source.
    pub age_group: String,
    /// Reference population for the group.
    pub population: u32,
    /// Cumulative case count as of `report_date`.
    pub cases_total: u32,
    /// New cases on `report_date`; negative after corrections.
    pub cases_new: i32,
    /// Rolling 7-day case count.
    pub cases_7day: u32,
    /// 7-day incidence per 100,000 population.
    pub incidence_7day: f64,
}

impl Record {
    /// Calendar-month key in `"YYYY-MM"` form.
    pub fn month_key(&self) -> String {
        format!(
            "{:04}-{:02}",
            self.report_date.year(),
            self.report_date.month()
        )
    }
}

/// Records in file order, frozen once loading completes.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    records: Vec<Record>,
}

impl RecordSet {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Counters describing a single load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Non-blank data lines seen after the header.
    pub lines_read: usize,
    /// Lines that produced a record.
    pub records_loaded: usize,
    /// Lines with fewer than the required number of fields.
    pub short_lines: usize,
    /// Rows dropped because they failed to parse (skip policy only).
    pub invalid_rows: usize,
}

/// What to do with a row whose fields fail to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowPolicy {
    /// Fail the whole load on the first bad row.
    #[default]
    Abort,
    /// Log the row, count it, and keep going.
    Skip,
}

/// The three reports the analyzer can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// Every record in load order.
    FullTable,
    /// Mean incidence per calendar month.
    MonthlyAverage,
    /// Days carrying the highest incidence.
    MaxIncidence,
}

impl ReportKind {
    pub const ALL: [ReportKind; 3] = [
        ReportKind::FullTable,
        ReportKind::MonthlyAverage,
        ReportKind::MaxIncidence,
    ];

    /// Map a numbered menu entry to a report.
    pub fn from_menu_choice(choice: u32) -> Option<Self> {
        match choice {
            1 => Some(ReportKind::FullTable),
            2 => Some(ReportKind::MonthlyAverage),
            3 => Some(ReportKind::MaxIncidence),
            _ => None,
        }
    }

    pub fn menu_choice(self) -> u32 {
        match self {
            ReportKind::FullTable => 1,
            ReportKind::MonthlyAverage => 2,
            ReportKind::MaxIncidence => 3,
        }
    }

    /// Name accepted on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            ReportKind::FullTable => "full",
            ReportKind::MonthlyAverage => "monthly",
            ReportKind::MaxIncidence => "max",
        }
    }

    /// Menu label.
    pub fn description(self) -> &'static str {
        match self {
            ReportKind::FullTable => "Show all records as a table",
            ReportKind::MonthlyAverage => "Show the average incidence per month",
            ReportKind::MaxIncidence => "Show the days with the highest incidence",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = AnalyzerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full" | "1" => Ok(ReportKind::FullTable),
            "monthly" | "2" => Ok(ReportKind::MonthlyAverage),
            "max" | "3" => Ok(ReportKind::MaxIncidence),
            other => Err(AnalyzerError::InvalidReport(other.to_string())),
        }
    }
}
