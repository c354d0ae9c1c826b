//! Tabular payloads: rows of string cells.
//!
//! Remote range reads come back as JSON—either a bare array of rows or an
//! object carrying the rows under a `"values"` key, the shape spreadsheet
//! APIs use. [`Table::from_json`] decodes that into rows of owned strings,
//! reporting anything non-tabular as a [`FetchFault::Malformed`] so the
//! fetcher fails fast instead of retrying a payload that cannot improve.

use serde_json::Value;

use crate::fetch::FetchFault;

/// A parsed tabular payload: rows of string cells.
///
/// Rows are not required to have equal length; short rows stay short.
///
/// # Examples
///
/// ```rust
/// use steadfast::Table;
///
/// let payload = serde_json::json!({
///     "values": [["name", "qty"], ["bolts", 42]]
/// });
///
/// let table = Table::from_json(&payload, false).unwrap();
/// assert_eq!(table.row_count(), 2);
/// assert_eq!(table.get(1, 1), Some("42"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Table {
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Create a table from pre-built rows.
    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Decode a JSON payload into a table.
    ///
    /// Accepts a bare array of rows or an object with a `"values"` array.
    /// Scalar cells are stringified (`null` becomes the empty string);
    /// nested arrays or objects in a cell make the payload malformed.
    ///
    /// With `keep_empty_rows = false`, rows with no cells are dropped.
    pub fn from_json(value: &Value, keep_empty_rows: bool) -> Result<Self, FetchFault> {
        let rows_json = match value {
            Value::Array(rows) => rows,
            Value::Object(map) => match map.get("values") {
                Some(Value::Array(rows)) => rows,
                Some(other) => {
                    return Err(FetchFault::malformed(format!(
                        "expected \"values\" to be an array, got {}",
                        json_kind(other)
                    )))
                }
                None => {
                    return Err(FetchFault::malformed(
                        "object payload has no \"values\" key",
                    ))
                }
            },
            other => {
                return Err(FetchFault::malformed(format!(
                    "expected tabular payload, got {}",
                    json_kind(other)
                )))
            }
        };

        let mut rows = Vec::with_capacity(rows_json.len());
        for (index, row) in rows_json.iter().enumerate() {
            let cells_json = match row {
                Value::Array(cells) => cells,
                other => {
                    return Err(FetchFault::malformed(format!(
                        "row {} is not an array, got {}",
                        index,
                        json_kind(other)
                    )))
                }
            };

            let mut cells = Vec::with_capacity(cells_json.len());
            for (col, cell) in cells_json.iter().enumerate() {
                cells.push(match cell {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    Value::Null => String::new(),
                    nested => {
                        return Err(FetchFault::malformed(format!(
                            "cell ({}, {}) is not a scalar, got {}",
                            index,
                            col,
                            json_kind(nested)
                        )))
                    }
                });
            }

            if keep_empty_rows || !cells.is_empty() {
                rows.push(cells);
            }
        }

        Ok(Self { rows })
    }

    /// All rows.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The cell at (row, col), if present.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }

    /// Consume the table, yielding its rows.
    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }

    /// Iterate over rows.
    pub fn iter(&self) -> std::slice::Iter<'_, Vec<String>> {
        self.rows.iter()
    }
}

impl IntoIterator for Table {
    type Item = Vec<String>;
    type IntoIter = std::vec::IntoIter<Vec<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a Vec<String>;
    type IntoIter = std::slice::Iter<'a, Vec<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
