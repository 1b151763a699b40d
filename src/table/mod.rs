//! Tabular data model
//!
//! The canonical student dataset and everything handed to the classifier is
//! a [`Table`]: an ordered list of named columns over row-major cells. Cell
//! values are loosely typed ([`Value`]) because uploads arrive with mixed
//! content; the schema normalizer is what turns them into something the
//! model can consume.

pub mod csv;
pub mod excel;
pub mod store;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map};

/// A single cell. CSV empties and JSON nulls both land on `Null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Num(f64),
    Str(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view: numbers pass through, strings are trim-parsed.
    pub fn as_num(&self) -> Option<f64> {
        match self {
            Value::Num(n) if n.is_finite() => Some(*n),
            Value::Str(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    /// Stable string form. Whole numbers print without a fraction so that
    /// re-reading a written table yields the same cell.
    pub fn to_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Num(n) => fmt_num(*n),
            Value::Str(s) => s.clone(),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Num(n) => {
                if n.fract() == 0.0 && n.is_finite() && n.abs() < 9_007_199_254_740_992.0 {
                    json!(*n as i64)
                } else {
                    json!(*n)
                }
            }
            Value::Str(s) => json!(s),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Number(n) => n.as_f64().map(Value::Num).unwrap_or(Value::Null),
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Bool(b) => Value::Str(b.to_string()),
            other => Value::Str(other.to_string()),
        }
    }
}

pub(crate) fn fmt_num(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 9_007_199_254_740_992.0 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Column-ordered table. Rows are kept dense: every row has exactly one
/// cell per column.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Append a row, padding or truncating to the column count.
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Null);
        self.rows.push(row);
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    pub fn set(&mut self, row: usize, column: &str, value: Value) {
        if let Some(idx) = self.column_index(column) {
            if let Some(r) = self.rows.get_mut(row) {
                r[idx] = value;
            }
        }
    }

    /// Values of one column in row order, or `None` if the column is absent.
    pub fn column_values(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| &r[idx]).collect())
    }

    /// Insert a column at the front (used for synthesized `student_id`).
    pub fn insert_column_front(&mut self, name: &str, values: Vec<Value>) {
        debug_assert_eq!(values.len(), self.rows.len());
        self.columns.insert(0, name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.insert(0, value);
        }
    }

    /// Append a column at the end; missing tail values become `Null`.
    pub fn push_column(&mut self, name: &str, mut values: Vec<Value>) {
        values.resize(self.rows.len(), Value::Null);
        self.columns.push(name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
    }

    /// Drop a column and its cells; a no-op when the column is absent.
    pub fn remove_column(&mut self, name: &str) {
        if let Some(idx) = self.column_index(name) {
            self.columns.remove(idx);
            for row in &mut self.rows {
                row.remove(idx);
            }
        }
    }

    /// One row as a JSON object, column order preserved.
    pub fn row_record(&self, row: usize) -> Map<String, serde_json::Value> {
        let mut record = Map::new();
        if let Some(cells) = self.rows.get(row) {
            for (name, value) in self.columns.iter().zip(cells) {
                record.insert(name.clone(), value.to_json());
            }
        }
        record
    }

    /// Whole table as JSON records.
    pub fn records(&self) -> Vec<Map<String, serde_json::Value>> {
        (0..self.rows.len()).map(|i| self.row_record(i)).collect()
    }

    /// Build a single-row table from a JSON object (the `/api/predict` body).
    pub fn from_record(record: &Map<String, serde_json::Value>) -> Self {
        let mut table = Table::new(record.keys().cloned().collect());
        table.push_row(record.values().cloned().map(Value::from).collect());
        table
    }
}
