//! Raw tabular sources: CSV text and YAML/JSON row lists.

use crate::error::{AuditError, CatalogErrorKind, Result};
use serde_json::Value;
use std::collections::HashMap;

use super::columns::{Column, HeaderMap};

/// One source row with its cells keyed by canonical column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based data row number (header excluded)
    pub row: usize,
    pub cells: HashMap<Column, String>,
}

impl RawRow {
    /// Trimmed cell text, empty when absent.
    #[must_use]
    pub fn text(&self, column: Column) -> &str {
        self.cells.get(&column).map_or("", |v| v.trim())
    }

    /// Trimmed cell text, `None` when absent or blank.
    #[must_use]
    pub fn optional(&self, column: Column) -> Option<String> {
        let text = self.text(column);
        (!text.is_empty()).then(|| text.to_string())
    }

    /// Whether every identifier cell is blank.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        [Column::Domain, Column::Qid, Column::Item]
            .iter()
            .all(|c| self.text(*c).is_empty())
    }
}

/// Rows of a source with its header layout.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: HeaderMap,
    pub rows: Vec<RawRow>,
}

/// Pick `;` when the header line has more semicolons than commas.
fn sniff_delimiter(text: &str) -> u8 {
    let header = text.lines().next().unwrap_or_default();
    if header.matches(';').count() > header.matches(',').count() {
        b';'
    } else {
        b','
    }
}

/// Parse CSV text with a header row. The delimiter (`,` or `;`) is detected
/// from the header line.
pub fn read_csv(text: &str) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(sniff_delimiter(text))
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| AuditError::catalog("reading CSV header", CatalogErrorKind::Csv(e.to_string())))?
        .clone();
    let header_map = HeaderMap::from_headers(headers.iter());

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|e| {
            AuditError::catalog(
                format!("reading CSV row {}", index + 1),
                CatalogErrorKind::Csv(e.to_string()),
            )
        })?;
        let cells = header_map
            .columns
            .iter()
            .zip(record.iter())
            .filter_map(|(column, value)| column.map(|c| (c, value.to_string())))
            .collect();
        rows.push(RawRow {
            row: index + 1,
            cells,
        });
    }
    Ok(RawTable {
        headers: header_map,
        rows,
    })
}

/// Cell text of a structured value. Lists are joined with `;`.
fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(cell_text)
                .collect::<Vec<_>>()
                .join(";"),
        ),
        Value::Object(_) => None,
    }
}

/// Rows of a YAML/JSON document: a list of objects, or an object holding
/// one under `rows`, `questions` or `items`.
pub fn read_structured(doc: &Value) -> Result<RawTable> {
    let list = match doc {
        Value::Array(list) => list,
        Value::Object(map) => ["rows", "questions", "items"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array))
            .ok_or_else(|| {
                AuditError::catalog(
                    "reading structured catalog",
                    CatalogErrorKind::Json("expected a list of rows or a 'rows' key".to_string()),
                )
            })?,
        _ => {
            return Err(AuditError::catalog(
                "reading structured catalog",
                CatalogErrorKind::Json("expected a list of rows".to_string()),
            ))
        }
    };

    // Header layout from the union of keys, in first-seen order.
    let mut keys: Vec<&str> = Vec::new();
    for entry in list {
        if let Value::Object(map) = entry {
            for key in map.keys() {
                if !keys.contains(&key.as_str()) {
                    keys.push(key);
                }
            }
        }
    }
    let headers = HeaderMap::from_keys(keys.iter().copied());
    let column_of: HashMap<&str, Column> = keys
        .iter()
        .zip(headers.columns.iter())
        .filter_map(|(key, column)| column.map(|c| (*key, c)))
        .collect();

    let mut rows = Vec::with_capacity(list.len());
    for (index, entry) in list.iter().enumerate() {
        let Value::Object(map) = entry else {
            return Err(AuditError::catalog(
                format!("row {}", index + 1),
                CatalogErrorKind::Json("row is not an object".to_string()),
            ));
        };
        let cells = map
            .iter()
            .filter_map(|(key, value)| {
                let column = column_of.get(key.as_str())?;
                cell_text(value).map(|text| (*column, text))
            })
            .collect();
        rows.push(RawRow {
            row: index + 1,
            cells,
        });
    }
    Ok(RawTable { headers, rows })
}
