//! Delimited-text parser for clinic exports.
//!
//! Deliberately simple: a `"` toggles the quoted state and is dropped, a comma outside
//! quotes ends a field, and the quoted state never carries across a line end. Doubled
//! quotes are not treated as escapes. Parsing cannot fail.

use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::metrics::ParseMetrics;

const BYTE_ORDER_MARK: char = '\u{feff}';
const DELIMITER: char = ',';
const QUOTE: char = '"';

/// One data row, keyed by header label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedRow {
    /// 1-based line number in the source text (after empty lines were dropped)
    pub line: usize,
    pub fields: HashMap<String, String>,
}

impl ParsedRow {
    /// Value of a column, or an empty string when the header is unknown
    pub fn get(&self, column: &str) -> &str {
        self.fields.get(column).map(String::as_str).unwrap_or("")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedTable {
    pub headers: Vec<String>,
    pub rows: Vec<ParsedRow>,
    /// Rows discarded because their name column was empty
    pub dropped_rows: usize,
}

/// Parses header + data rows, dropping rows whose `name_column` is empty
pub struct DelimitedParser {
    name_column: String,
}

impl DelimitedParser {
    pub fn new(name_column: impl Into<String>) -> Self {
        Self { name_column: name_column.into() }
    }

    pub fn parse(&self, text: &str) -> ParsedTable {
        let mut table = parse_table(text);
        let before = table.rows.len();
        let name_column = self.name_column.as_str();

        if !table.headers.iter().any(|h| h == name_column) {
            warn!("Name column '{}' is missing from the header row", name_column);
        }

        table.rows.retain(|row| !row.get(name_column).is_empty());
        table.dropped_rows = before - table.rows.len();

        if table.dropped_rows > 0 {
            debug!("Dropped {} rows without a name", table.dropped_rows);
        }
        ParseMetrics::record_rows(table.rows.len(), table.dropped_rows);
        table
    }
}

/// Parse every non-empty line; the first one is the header row.
/// No rows are filtered out here.
pub fn parse_table(text: &str) -> ParsedTable {
    let text = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text);

    let mut lines = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.is_empty());

    let headers: Vec<String> = match lines.next() {
        Some(header_line) => split_line(header_line)
            .into_iter()
            .map(|h| h.trim_start_matches(BYTE_ORDER_MARK).to_string())
            .collect(),
        None => return ParsedTable::default(),
    };

    let rows = lines
        .enumerate()
        .map(|(idx, line)| {
            let cells = split_line(line);
            if cells.len() != headers.len() {
                debug!(
                    "Line {} has {} cells for {} headers",
                    idx + 2,
                    cells.len(),
                    headers.len()
                );
            }
            let fields = headers
                .iter()
                .enumerate()
                .map(|(i, header)| {
                    let value = cells.get(i).cloned().unwrap_or_default();
                    (header.clone(), value)
                })
                .collect();
            ParsedRow { line: idx + 2, fields }
        })
        .collect();

    ParsedTable { headers, rows, dropped_rows: 0 }
}

/// Split one line into trimmed fields.
/// An unterminated quote simply keeps the rest of the line in the current field.
pub fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            QUOTE => in_quotes = !in_quotes,
            DELIMITER if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    fields.push(current.trim().to_string());

    fields
}
