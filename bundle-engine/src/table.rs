//! Raw tabular input.
//!
//! Inputs arrive as header + string cells so that the column contracts can
//! be resolved by alias at run time. Header comparison ignores case and any
//! non-alphanumeric character.

use std::collections::HashMap;

/// A header row plus string cells, one `Vec` per data row.
#[derive(Clone, Debug, Default)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    index: HashMap<String, usize>,
}

impl RawTable {
    pub fn new(headers: Vec<String>) -> Self {
        let mut index = HashMap::new();
        for (i, h) in headers.iter().enumerate() {
            // First occurrence wins on duplicate headers.
            index.entry(normalize_column_name(h)).or_insert(i);
        }
        Self {
            headers,
            rows: Vec::new(),
            index,
        }
    }

    /// Build a table from string literals. Handy in tests and fixtures.
    pub fn from_rows(headers: &[&str], rows: &[&[&str]]) -> Self {
        let mut table = Self::new(headers.iter().map(|h| h.to_string()).collect());
        for row in rows {
            table.push_row(row.iter().map(|c| c.to_string()).collect());
        }
        table
    }

    /// Append a row. Short rows read as blank cells in the missing columns.
    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        self.rows.iter().map(|r| r.as_slice())
    }

    /// Position of the first column matching any of `aliases`, in alias order.
    pub fn find_column(&self, aliases: &[&str]) -> Option<usize> {
        aliases
            .iter()
            .find_map(|a| self.index.get(&normalize_column_name(a)).copied())
    }

    pub fn has_column(&self, aliases: &[&str]) -> bool {
        self.find_column(aliases).is_some()
    }
}

/// Trimmed text of a cell, or "" for a missing cell.
pub fn cell(row: &[String], col: usize) -> &str {
    row.get(col).map(|s| s.trim()).unwrap_or("")
}

/// Lowercase and drop everything that is not ASCII alphanumeric.
pub fn normalize_column_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Lenient numeric parse for report-style cells.
///
/// Keeps only digits, `.` and `-`, so thousands separators, percent signs,
/// currency symbols and unit words all drop out. Blank or unparsable input
/// reads as 0.
pub fn parse_number(text: &str) -> f64 {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-'))
        .collect();
    match cleaned.as_str() {
        "" | "-" | "." | "-." => 0.0,
        s => s.parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0),
    }
}
