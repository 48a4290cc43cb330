//! Tabular extraction from decoded payloads.
//!
//! Every provider payload (CSV download, JSON table object, or HTML page)
//! is reduced to the same shape: an ordered sequence of rows, each an
//! ordered sequence of raw cell strings. No validation happens here; the
//! record assembler judges validity against each metric's header sentinel.

use scraper::{Html, Selector};
use serde_json::Value;

/// Ordered rows of raw cell strings extracted from one payload.
///
/// Immutable once built; columns are addressed purely positionally
/// downstream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[String]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column).map(String::as_str)
    }

    /// Split CSV text into rows and cells.
    ///
    /// The downloads carry no usable header labels, so no header detection
    /// is attempted; ragged rows are kept as-is.
    pub fn from_csv(text: &str) -> Self {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());
        let rows = reader
            .records()
            .filter_map(|record| record.ok())
            .map(|record| record.iter().map(|cell| cell.trim().to_owned()).collect())
            .collect();
        Self { rows }
    }

    /// Extract an `aaData`/`data`/`tables[i].data`-shaped array of arrays.
    ///
    /// Such sources are already text-safe JSON; numeric values are carried
    /// as their textual form so the numeric normalizer treats every provider
    /// the same way.
    pub fn from_json_rows(rows: &[Value]) -> Self {
        let rows = rows
            .iter()
            .filter_map(Value::as_array)
            .map(|cells| cells.iter().map(json_cell_to_string).collect())
            .collect();
        Self { rows }
    }

    /// Extract table rows from an HTML page by structural selector.
    ///
    /// Cell text is trimmed; an unparsable selector yields an empty table,
    /// which downstream layers treat as "no data".
    pub fn from_html(html: &str, row_selector: &str) -> Self {
        let Ok(rows_selector) = Selector::parse(row_selector) else {
            return Self::default();
        };
        let Ok(cells_selector) = Selector::parse("td, th") else {
            return Self::default();
        };

        let document = Html::parse_document(html);
        let rows = document
            .select(&rows_selector)
            .map(|row| {
                row.select(&cells_selector)
                    .map(|cell| cell.text().collect::<String>().trim().to_owned())
                    .collect()
            })
            .collect();
        Self { rows }
    }
}

fn json_cell_to_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.trim().to_owned(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
