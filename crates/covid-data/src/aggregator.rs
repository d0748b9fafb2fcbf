//! Incidence aggregation over calendar months, plus peak-day selection.

use std::collections::BTreeMap;

use covid_core::models::Record;

// ── IncidenceStats ────────────────────────────────────────────────────────────

/// Running sum and count of 7-day incidence values.
#[derive(Debug, Clone, Default)]
pub struct IncidenceStats {
    pub sum: f64,
    pub count: u32,
}

impl IncidenceStats {
    /// Add a single record's incidence to the running totals.
    pub fn add_record(&mut self, record: &Record) {
        self.sum += record.incidence_7day;
        self.count += 1;
    }

    /// Unweighted arithmetic mean; `0.0` when nothing was added.
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum / f64::from(self.count)
    }
}

// ── MonthlyPeriod ─────────────────────────────────────────────────────────────

/// All records reported within one calendar month.
#[derive(Debug, Clone)]
pub struct MonthlyPeriod {
    /// The period key, e.g. `"2021-03"`.
    pub period_key: String,
    pub stats: IncidenceStats,
}

impl MonthlyPeriod {
    fn new(period_key: impl Into<String>) -> Self {
        Self {
            period_key: period_key.into(),
            stats: IncidenceStats::default(),
        }
    }
}

// ── MaxIncidence ──────────────────────────────────────────────────────────────

/// The highest incidence value and every record that carries it.
#[derive(Debug, Clone)]
pub struct MaxIncidence<'a> {
    pub value: f64,
    /// Records in load order.
    pub days: Vec<&'a Record>,
}

// ── IncidenceAggregator ───────────────────────────────────────────────────────

/// Stateless helper that groups and scans records.
pub struct IncidenceAggregator;

impl IncidenceAggregator {
    /// Aggregate `records` by calendar month. Key format: `"%Y-%m"`.
    ///
    /// Returns periods sorted by key (ascending), which is chronological.
    pub fn aggregate_monthly(records: &[Record]) -> Vec<MonthlyPeriod> {
        let mut map: BTreeMap<String, MonthlyPeriod> = BTreeMap::new();

        for record in records {
            let key = record.month_key();
            map.entry(key.clone())
                .or_insert_with(|| MonthlyPeriod::new(key))
                .stats
                .add_record(record);
        }

        map.into_values().collect()
    }

    /// Find the maximum incidence and all records equal to it.
    ///
    /// Ties are detected with exact `f64` equality. Returns `None` for an
    /// empty slice.
    pub fn max_incidence(records: &[Record]) -> Option<MaxIncidence<'_>> {
        let value = records
            .iter()
            .map(|r| r.incidence_7day)
            .reduce(f64::max)?;

        let days = records
            .iter()
            .filter(|r| r.incidence_7day == value)
            .collect();

        Some(MaxIncidence { value, days })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
