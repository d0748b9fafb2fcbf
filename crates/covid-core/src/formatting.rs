use chrono::NaiveDate;

/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// The decimal separator is always `.`, whatever the host locale.
///
/// # Examples
///
/// ```
/// use covid_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5,  1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    let negative = value < 0.0;
    let abs_value = value.abs();

    // Nudge by a tiny epsilon before rounding so exact decimal midpoints
    // such as 1.005 round away from zero. Past 2^53 every f64 is already an
    // integer and the nudge would only move it to a neighbouring value.
    let factor = 10_f64.powi(decimals as i32);
    let scaled = abs_value * factor;
    let rounded = if scaled < 9_007_199_254_740_992.0 {
        (scaled + f64::EPSILON * scaled).round() / factor
    } else {
        abs_value
    };

    let digits = format!("{:.prec$}", rounded, prec = decimals as usize);
    let result = match digits.split_once('.') {
        Some((int_part, frac_part)) => format!("{}.{}", group_thousands(int_part), frac_part),
        None => group_thousands(&digits),
    };

    if negative && rounded != 0.0 {
        format!("-{}", result)
    } else {
        result
    }
}

/// Format a calendar date as `DD.MM.YYYY`.
///
/// ```
/// use chrono::NaiveDate;
/// use covid_core::formatting::format_date;
///
/// let date = NaiveDate::from_ymd_opt(2021, 3, 9).unwrap();
/// assert_eq!(format_date(date), "09.03.2021");
/// ```
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

// ── TextTable ─────────────────────────────────────────────────────────────────

/// Horizontal alignment of a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// A fixed-width column: header title, minimum width and alignment.
#[derive(Debug, Clone)]
pub struct Column {
    pub title: String,
    pub width: usize,
    pub align: Align,
}

impl Column {
    pub fn left(title: impl Into<String>, width: usize) -> Self {
        Self {
            title: title.into(),
            width,
            align: Align::Left,
        }
    }

    pub fn right(title: impl Into<String>, width: usize) -> Self {
        Self {
            title: title.into(),
            width,
            align: Align::Right,
        }
    }

    /// Pad `cell` to the column width. Wider cells overflow untouched.
    fn pad(&self, cell: &str) -> String {
        match self.align {
            Align::Left => format!("{:<width$}", cell, width = self.width),
            Align::Right => format!("{:>width$}", cell, width = self.width),
        }
    }
}

/// Plain-text table with a header line, a `-` rule and one line per row.
///
/// Columns are separated by a single space and trailing whitespace is
/// trimmed from every line.
///
/// ```
/// use covid_core::formatting::{Column, TextTable};
///
/// let mut table = TextTable::new(vec![Column::left("Month", 7), Column::right("Avg", 6)]);
/// table.push_row(vec!["2021-01".to_string(), "1.50".to_string()]);
/// assert_eq!(table.render(), "Month      Avg\n--------------\n2021-01   1.50\n");
/// ```
#[derive(Debug, Clone)]
pub struct TextTable {
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row. Missing trailing cells render as blanks; extra cells are ignored.
    pub fn push_row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    /// Total width of the padded columns including the separating spaces.
    pub fn width(&self) -> usize {
        let cols: usize = self.columns.iter().map(|c| c.width).sum();
        cols + self.columns.len().saturating_sub(1)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();

        let titles: Vec<&str> = self.columns.iter().map(|c| c.title.as_str()).collect();
        self.write_line(&mut out, &titles);

        out.push_str(&"-".repeat(self.width()));
        out.push('\n');

        for row in &self.rows {
            let cells: Vec<&str> = row.iter().map(String::as_str).collect();
            self.write_line(&mut out, &cells);
        }

        out
    }

    fn write_line(&self, out: &mut String, cells: &[&str]) {
        let line = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, col)| col.pad(cells.get(i).copied().unwrap_or("")))
            .collect::<Vec<_>>()
            .join(" ");
        out.push_str(line.trim_end());
        out.push('\n');
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────
