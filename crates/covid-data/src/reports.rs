//! Text reports over a loaded record set.
//!
//! Each report is a [`TextTable`]: a header line, a `-` rule, then one line
//! per qualifying row. None of them modify the records.

use covid_core::error::{AnalyzerError, Result};
use covid_core::formatting::{format_date, format_number, Column, TextTable};
use covid_core::models::{Record, RecordSet, ReportKind};

use crate::aggregator::IncidenceAggregator;

/// Decimal places shown for incidence values.
const DECIMALS: u32 = 2;

/// Render the report selected by `kind`.
pub fn render(kind: ReportKind, records: &RecordSet) -> Result<String> {
    match kind {
        ReportKind::FullTable => Ok(full_table(records)),
        ReportKind::MonthlyAverage => Ok(monthly_average(records)),
        ReportKind::MaxIncidence => max_incidence_days(records),
    }
}

/// Every record in load order: date, age group, 7-day incidence.
pub fn full_table(records: &RecordSet) -> String {
    let mut table = TextTable::new(vec![
        Column::left("Date", 10),
        Column::left("Age group", 12),
        Column::right("Incidence", 10),
    ]);

    for record in records {
        table.push_row(day_row(record));
    }

    table.render()
}

/// Mean 7-day incidence per calendar month, oldest month first.
pub fn monthly_average(records: &RecordSet) -> String {
    let mut table = TextTable::new(vec![
        Column::left("Month", 7),
        Column::right("Average incidence", 20),
    ]);

    for period in IncidenceAggregator::aggregate_monthly(records.records()) {
        table.push_row(vec![
            period.period_key,
            format_number(period.stats.average(), DECIMALS),
        ]);
    }

    table.render()
}

/// All records sharing the highest 7-day incidence, in load order.
///
/// Returns [`AnalyzerError::NoData`] when `records` is empty.
pub fn max_incidence_days(records: &RecordSet) -> Result<String> {
    let max = IncidenceAggregator::max_incidence(records.records()).ok_or(AnalyzerError::NoData)?;

    let mut table = TextTable::new(vec![
        Column::left("Date", 10),
        Column::left("Age group", 12),
        Column::right("Max incidence", 15),
    ]);

    for record in max.days {
        table.push_row(day_row(record));
    }

    Ok(table.render())
}

fn day_row(record: &Record) -> Vec<String> {
    vec![
        format_date(record.report_date),
        record.age_group.clone(),
        format_number(record.incidence_7day, DECIMALS),
    ]
}
