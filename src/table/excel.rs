//! Excel workbook decoding for uploads (`.xlsx`/`.xls`).
//!
//! Only the first worksheet is read; its first row is the header.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use super::{Table, Value};

/// Read the first worksheet of a workbook into a table.
pub fn read(path: &Path) -> Result<Table, String> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| format!("could not open workbook: {e}"))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| "workbook has no worksheets".to_string())?
        .map_err(|e| format!("could not read worksheet: {e}"))?;

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| "worksheet is empty".to_string())?;

    let columns: Vec<String> = header.iter().map(|c| cell_text(c).trim().to_string()).collect();
    let mut table = Table::new(columns);

    for row in rows {
        table.push_row(row.iter().map(cell_value).collect());
    }
    Ok(table)
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::Float(f) => Value::Num(*f),
        Data::Int(i) => Value::Num(*i as f64),
        Data::String(s) => {
            let t = s.trim();
            if t.is_empty() {
                Value::Null
            } else {
                Value::Str(t.to_string())
            }
        }
        Data::Bool(b) => Value::Str(b.to_string()),
        Data::Error(_) => Value::Null,
        other => {
            let t = other.to_string();
            if t.trim().is_empty() {
                Value::Null
            } else {
                Value::Str(t.trim().to_string())
            }
        }
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}
