//! Named, typed, printf-formatted report tables.
//!
//! A [`ReportTable`] is an ordered list of columns plus rows of optional cells.
//! It carries no index of its own; keyed lookup lives in [`crate::index`].

use std::cmp::Ordering;
use std::fmt::{self, Display};
use std::str::FromStr;

use crate::consts::{DISABLED_LABEL, NULL_CELL, UNKNOWN_LABEL};
use crate::errors::{CovStratError, Result};
use crate::key::{StratificationKey, Value};

///
/// The printf-style format of a column. Supported specs are `%d`, `%s`, `%f`
/// and `%.Nf`.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnFormat {
    Integer,
    Float(Option<usize>),
    Text,
}

impl ColumnFormat {
    /// Render a cell. Empty cells print as `null`.
    pub fn format_cell(&self, value: Option<&Value>) -> String {
        let value = match value {
            Some(value) => value,
            None => return NULL_CELL.to_string(),
        };
        match (self, value) {
            (ColumnFormat::Float(precision), Value::Int(_) | Value::Float(_)) => {
                // as_f64 cannot fail for numeric values
                let v = value.as_f64().unwrap_or_default();
                format!("{:.*}", precision.unwrap_or(6), v)
            }
            (ColumnFormat::Integer, Value::Float(v)) => format!("{}", *v as i64),
            (_, Value::Label(label)) => escape_label(label),
            _ => value.to_string(),
        }
    }

    ///
    /// Round floats to the printed precision, so that a value survives being
    /// written and read back unchanged.
    ///
    pub fn normalize(&self, value: Value) -> Value {
        match (self, value) {
            (ColumnFormat::Float(Some(precision)), Value::Float(v)) if v.is_finite() => {
                let scale = 10f64.powi(*precision as i32);
                Value::Float((v * scale).round() / scale)
            }
            (_, value) => value,
        }
    }

    /// Parse a cell printed by [`ColumnFormat::format_cell`].
    pub fn parse_cell(&self, text: &str) -> std::result::Result<Option<Value>, String> {
        match text {
            NULL_CELL => return Ok(None),
            DISABLED_LABEL => return Ok(Some(Value::Disabled)),
            UNKNOWN_LABEL => return Ok(Some(Value::Unknown)),
            _ => {}
        }
        match self {
            ColumnFormat::Integer => text
                .parse::<i64>()
                .map(|v| Some(Value::Int(v)))
                .map_err(|e| format!("expected an integer, found '{}': {}", text, e)),
            ColumnFormat::Float(_) => text
                .parse::<f64>()
                .map(|v| Some(Value::Float(v)))
                .map_err(|e| format!("expected a number, found '{}': {}", text, e)),
            ColumnFormat::Text => Ok(Some(Value::Label(unescape_label(text)))),
        }
    }
}

fn is_reserved(text: &str) -> bool {
    text.is_empty() || text == NULL_CELL || text == DISABLED_LABEL || text == UNKNOWN_LABEL
}

///
/// Labels are printed with `\`, tab, newline and carriage return escaped. A label
/// that would read back as a sentinel (or is empty) gets a leading backslash.
///
fn escape_label(label: &str) -> String {
    let mut escaped = String::with_capacity(label.len() + 1);
    for c in label.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\t' => escaped.push_str("\\t"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            c => escaped.push(c),
        }
    }
    if is_reserved(&escaped) {
        escaped.insert(0, '\\');
    }
    escaped
}

fn unescape_label(text: &str) -> String {
    let mut label = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            label.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => label.push('\t'),
            Some('n') => label.push('\n'),
            Some('r') => label.push('\r'),
            Some(other) => label.push(other),
            None => {}
        }
    }
    label
}

impl FromStr for ColumnFormat {
    type Err = CovStratError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "%d" => Ok(ColumnFormat::Integer),
            "%s" => Ok(ColumnFormat::Text),
            "%f" => Ok(ColumnFormat::Float(None)),
            _ => s
                .strip_prefix("%.")
                .and_then(|rest| rest.strip_suffix('f'))
                .and_then(|digits| digits.parse::<usize>().ok())
                .map(|precision| ColumnFormat::Float(Some(precision)))
                .ok_or_else(|| CovStratError::InvalidColumnFormat(s.to_string())),
        }
    }
}

impl Display for ColumnFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnFormat::Integer => write!(f, "%d"),
            ColumnFormat::Text => write!(f, "%s"),
            ColumnFormat::Float(None) => write!(f, "%f"),
            ColumnFormat::Float(Some(precision)) => write!(f, "%.{}f", precision),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub format: ColumnFormat,
}

impl Column {
    pub fn new<S: Into<String>>(name: S, format: ColumnFormat) -> Self {
        Column {
            name: name.into(),
            format,
        }
    }
}

impl Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.format)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    name: String,
    description: String,
    columns: Vec<Column>,
    rows: Vec<Vec<Option<Value>>>,
}

impl ReportTable {
    pub fn new<S: Into<String>, D: Into<String>>(name: S, description: D) -> Self {
        ReportTable {
            name: name.into(),
            description: description.into(),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Adds a column and returns its index. Existing rows get an empty cell.
    pub fn add_column<S: Into<String>>(&mut self, name: S, format: ColumnFormat) -> usize {
        self.columns.push(Column::new(name, format));
        for row in &mut self.rows {
            row.push(None);
        }
        self.columns.len() - 1
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| CovStratError::MissingColumn {
                table: self.name.clone(),
                column: name.to_string(),
            })
    }

    /// Appends an empty row and returns its index.
    pub fn add_row(&mut self) -> usize {
        self.rows.push(vec![None; self.columns.len()]);
        self.rows.len() - 1
    }

    pub fn get(&self, row: usize, column: usize) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(column)).and_then(|c| c.as_ref())
    }

    pub fn set<V: Into<Value>>(&mut self, row: usize, column: usize, value: V) {
        self.rows[row][column] = Some(value.into());
    }

    pub fn row(&self, row: usize) -> &[Option<Value>] {
        &self.rows[row]
    }

    /// The first `n` cells of a row as a key. Every cell must be present.
    pub fn row_key(&self, row: usize, n: usize) -> Result<StratificationKey> {
        (0..n)
            .map(|column| {
                self.get(row, column)
                    .cloned()
                    .ok_or_else(|| self.invalid_cell(row, column))
            })
            .collect()
    }

    pub fn get_i64(&self, row: usize, column: usize) -> Result<i64> {
        self.get(row, column)
            .and_then(Value::as_i64)
            .ok_or_else(|| self.invalid_cell(row, column))
    }

    /// Integer cell where an empty cell counts as zero, as for fresh count rows.
    pub fn get_count(&self, row: usize, column: usize) -> Result<i64> {
        match self.get(row, column) {
            None => Ok(0),
            Some(value) => value.as_i64().ok_or_else(|| self.invalid_cell(row, column)),
        }
    }

    pub fn get_f64(&self, row: usize, column: usize) -> Result<f64> {
        self.get(row, column)
            .and_then(Value::as_f64)
            .ok_or_else(|| self.invalid_cell(row, column))
    }

    fn invalid_cell(&self, row: usize, column: usize) -> CovStratError {
        CovStratError::InvalidCell {
            table: self.name.clone(),
            row,
            column: self
                .columns
                .get(column)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| column.to_string()),
        }
    }

    /// A table with the same name, description and columns but no rows.
    pub fn header_copy(&self) -> Self {
        ReportTable {
            name: self.name.clone(),
            description: self.description.clone(),
            columns: self.columns.clone(),
            rows: Vec::new(),
        }
    }

    ///
    /// Structural schema comparison: table name and every column name and format
    /// must match, in order.
    ///
    pub fn check_same_format(&self, other: &ReportTable) -> Result<()> {
        let mismatch = |detail: String| CovStratError::SchemaMismatch {
            table: self.name.clone(),
            detail,
        };
        if self.name != other.name {
            return Err(mismatch(format!(
                "table name differs: {} / {}",
                self.name, other.name
            )));
        }
        if self.columns.len() != other.columns.len() {
            return Err(mismatch(format!(
                "expected {} columns, found {}",
                self.columns.len(),
                other.columns.len()
            )));
        }
        for (i, (expected, actual)) in self.columns.iter().zip(&other.columns).enumerate() {
            if expected != actual {
                return Err(mismatch(format!(
                    "column {}: expected {}, found {}",
                    i, expected, actual
                )));
            }
        }
        Ok(())
    }

    pub fn is_same_format(&self, other: &ReportTable) -> bool {
        self.check_same_format(other).is_ok()
    }

    /// Row indices ordered by cell values, first column dominant.
    pub fn sorted_row_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.rows.len()).collect();
        order.sort_by(|&a, &b| compare_cells(&self.rows[a], &self.rows[b]));
        order
    }
}

fn compare_cells(a: &[Option<Value>], b: &[Option<Value>]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        match x.cmp(y) {
            Ordering::Equal => continue,
            ord => return ord,
        }
    }
    a.len().cmp(&b.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case("%d", ColumnFormat::Integer)]
    #[case("%s", ColumnFormat::Text)]
    #[case("%f", ColumnFormat::Float(None))]
    #[case("%.8f", ColumnFormat::Float(Some(8)))]
    fn test_parse_format(#[case] spec: &str, #[case] expected: ColumnFormat) {
        let format: ColumnFormat = spec.parse().unwrap();
        assert_eq!(format, expected);
        assert_eq!(format.to_string(), spec);
    }

    #[rstest]
    fn test_invalid_format() {
        assert!("%x".parse::<ColumnFormat>().is_err());
        assert!("%.af".parse::<ColumnFormat>().is_err());
    }

    #[rstest]
    fn test_format_cells() {
        assert_eq!(ColumnFormat::Integer.format_cell(Some(&Value::Int(42))), "42");
        assert_eq!(
            ColumnFormat::Float(Some(2)).format_cell(Some(&Value::Float(0.125))),
            "0.12"
        );
        assert_eq!(
            ColumnFormat::Float(Some(1)).format_cell(Some(&Value::Int(3))),
            "3.0"
        );
        assert_eq!(ColumnFormat::Text.format_cell(Some(&Value::Disabled)), "disabled");
        assert_eq!(ColumnFormat::Integer.format_cell(None), "null");
    }

    #[rstest]
    fn test_parse_cells() {
        assert_eq!(ColumnFormat::Integer.parse_cell("7").unwrap(), Some(Value::Int(7)));
        assert_eq!(ColumnFormat::Integer.parse_cell("unknown").unwrap(), Some(Value::Unknown));
        assert_eq!(ColumnFormat::Float(Some(1)).parse_cell("null").unwrap(), None);
        assert!(ColumnFormat::Integer.parse_cell("abc").is_err());
    }

    #[rstest]
    #[case("rg1")]
    #[case("null")]
    #[case("unknown")]
    #[case("disabled")]
    #[case("")]
    #[case("\\null")]
    #[case("lane\t1\nb\\c")]
    fn test_labels_never_read_back_as_sentinels(#[case] label: &str) {
        let value = Value::from(label);
        let printed = ColumnFormat::Text.format_cell(Some(&value));
        assert!(!printed.contains('\t') && !printed.contains('\n'));
        assert_eq!(ColumnFormat::Text.parse_cell(&printed).unwrap(), Some(value));
    }

    #[rstest]
    fn test_sentinels_in_text_columns() {
        assert_eq!(ColumnFormat::Text.format_cell(Some(&Value::Unknown)), "unknown");
        assert_eq!(ColumnFormat::Text.format_cell(Some(&Value::from("unknown"))), "\\unknown");
        assert_eq!(ColumnFormat::Text.parse_cell("unknown").unwrap(), Some(Value::Unknown));
        assert_eq!(ColumnFormat::Text.parse_cell("null").unwrap(), None);
    }

    #[rstest]
    fn test_normalize_matches_printed_value() {
        let format = ColumnFormat::Float(Some(1));
        let raw = (100.0f64 / 3.0 / 0.1).floor() * 0.1;
        let normalized = format.normalize(Value::Float(raw));
        let printed = format.format_cell(Some(&normalized));
        assert_eq!(printed, "33.3");
        assert_eq!(format.parse_cell(&printed).unwrap(), Some(normalized));
        assert_eq!(ColumnFormat::Integer.normalize(Value::Int(3)), Value::Int(3));
        assert_eq!(format.normalize(Value::Unknown), Value::Unknown);
    }

    #[rstest]
    fn test_rows_and_columns() {
        let mut table = ReportTable::new("Counts", "Counts");
        let name = table.add_column("name", ColumnFormat::Text);
        let row = table.add_row();
        table.set(row, name, "a");
        let count = table.add_column("count", ColumnFormat::Integer);

        assert_eq!(table.row_count(), 1);
        assert_eq!(table.get(row, count), None);
        assert_eq!(table.get_count(row, count).unwrap(), 0);
        assert!(table.get_i64(row, count).is_err());
        assert_eq!(table.column_index("count"), Some(1));
        assert!(table.require_column("missing").is_err());
    }

    #[rstest]
    fn test_schema_mismatch_names_column() {
        let mut a = ReportTable::new("ReadCounts", "ReadCounts");
        a.add_column("gc_content", ColumnFormat::Float(Some(1)));
        a.add_column("count", ColumnFormat::Integer);
        let mut b = ReportTable::new("ReadCounts", "ReadCounts");
        b.add_column("mappability", ColumnFormat::Integer);
        b.add_column("count", ColumnFormat::Integer);

        let err = a.check_same_format(&b).unwrap_err().to_string();
        assert!(err.contains("ReadCounts"));
        assert!(err.contains("gc_content(%.1f)"));
        assert!(err.contains("mappability(%d)"));
        assert!(a.is_same_format(&a.header_copy()));
    }

    #[rstest]
    fn test_sorted_row_order() {
        let mut table = ReportTable::new("T", "T");
        table.add_column("a", ColumnFormat::Integer);
        table.add_column("b", ColumnFormat::Integer);
        for (a, b) in [(2, 1), (1, 5), (1, 2)] {
            let row = table.add_row();
            table.set(row, 0, a as i64);
            table.set(row, 1, b as i64);
        }
        assert_eq!(table.sorted_row_order(), vec![2, 1, 0]);
    }
}
