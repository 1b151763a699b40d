//! The 13-feature schema and the normalizer that coerces arbitrary tabular
//! input into it.
//!
//! Everything the classifier sees goes through [`normalize`]: exactly the
//! schema columns, in schema order, with no missing values. The default
//! table (0 for numerics, one canonical fallback per categorical) is
//! immutable and process-wide.

use crate::table::{Table, Value};

pub const STUDENT_ID: &str = "student_id";
pub const STUDENT_NAME: &str = "Student_Name";
pub const RESULT: &str = "result";
pub const PROBABILITY: &str = "prediction_probability";

/// First synthesized `student_id` when the source data lacks the column.
pub const FIRST_STUDENT_ID: u32 = 1001;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Numeric,
    Categorical,
}

#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Canonical fallback for categoricals; unused for numerics (always 0).
    fallback: &'static str,
}

impl Field {
    pub fn default_value(&self) -> Value {
        match self.kind {
            FieldKind::Numeric => Value::Num(0.0),
            FieldKind::Categorical => Value::Str(self.fallback.to_string()),
        }
    }
}

/// The fixed feature schema, in model input order.
pub const SCHEMA: [Field; 13] = [
    Field { name: "Hours_Studied", kind: FieldKind::Numeric, fallback: "" },
    Field { name: "Attendance", kind: FieldKind::Numeric, fallback: "" },
    Field { name: "Parental_Involvement", kind: FieldKind::Categorical, fallback: "Medium" },
    Field { name: "Access_to_Resources", kind: FieldKind::Categorical, fallback: "Yes" },
    Field { name: "Previous_Scores", kind: FieldKind::Numeric, fallback: "" },
    Field { name: "Internet_Access", kind: FieldKind::Categorical, fallback: "Yes" },
    Field { name: "Tutoring_Sessions", kind: FieldKind::Numeric, fallback: "" },
    Field { name: "Family_Income", kind: FieldKind::Numeric, fallback: "" },
    Field { name: "Peer_Influence", kind: FieldKind::Categorical, fallback: "Neutral" },
    Field { name: "Learning_Disabilities", kind: FieldKind::Categorical, fallback: "No" },
    Field { name: "Parental_Education_Level", kind: FieldKind::Categorical, fallback: "Secondary" },
    Field { name: "Distance_from_Home", kind: FieldKind::Numeric, fallback: "" },
    Field { name: "Gender", kind: FieldKind::Categorical, fallback: "Other" },
];

pub fn column_names() -> Vec<String> {
    SCHEMA.iter().map(|f| f.name.to_string()).collect()
}

/// Schema columns missing from `table`, in schema order.
pub fn missing_columns(table: &Table) -> Vec<&'static str> {
    SCHEMA
        .iter()
        .filter(|f| !table.has_column(f.name))
        .map(|f| f.name)
        .collect()
}

/// Coerce `table` into the exact 13-column schema.
///
/// Pure with copy-on-write semantics: the input is never mutated, and extra
/// columns (ids, names, results) are simply not carried over. Callers that
/// need them keep the original rows alongside.
pub fn normalize(table: &Table) -> Table {
    // One mode per present categorical column, computed up front.
    let modes: Vec<Option<String>> = SCHEMA
        .iter()
        .map(|f| match f.kind {
            FieldKind::Categorical => table
                .column_values(f.name)
                .and_then(|values| column_mode(&values)),
            FieldKind::Numeric => None,
        })
        .collect();

    let mut out = Table::new(column_names());
    for row in 0..table.row_count() {
        let cells = SCHEMA
            .iter()
            .zip(&modes)
            .map(|(f, mode)| normalize_cell(f, table.get(row, f.name), mode.as_deref()))
            .collect();
        out.push_row(cells);
    }
    out
}

fn normalize_cell(field: &Field, value: Option<&Value>, mode: Option<&str>) -> Value {
    match field.kind {
        FieldKind::Numeric => {
            Value::Num(value.and_then(Value::as_num).unwrap_or(0.0))
        }
        FieldKind::Categorical => match value {
            // Column absent entirely: canonical default.
            None => field.default_value(),
            Some(v) if v.is_null() => {
                // Mode of the column; "Unknown" when the column is all null.
                Value::Str(mode.unwrap_or("Unknown").to_string())
            }
            Some(v) => Value::Str(v.to_text().trim().to_string()),
        },
    }
}

/// Most frequent non-null value, ties broken by first occurrence.
/// `None` when the column has no non-null values.
fn column_mode(values: &[&Value]) -> Option<String> {
    let mut seen: Vec<(String, usize)> = Vec::new();
    for v in values {
        if v.is_null() {
            continue;
        }
        let text = v.to_text().trim().to_string();
        match seen.iter_mut().find(|(s, _)| *s == text) {
            Some((_, count)) => *count += 1,
            None => seen.push((text, 1)),
        }
    }
    // Keep the current best unless strictly beaten, so ties resolve to the
    // earliest value.
    let mut best: Option<(String, usize)> = None;
    for (text, count) in seen {
        if best.as_ref().map_or(true, |(_, c)| count > *c) {
            best = Some((text, count));
        }
    }
    best.map(|(s, _)| s)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_of(columns: &[&str], rows: &[&[Value]]) -> Table {
        let mut t = Table::new(columns.iter().map(|c| c.to_string()).collect());
        for row in rows {
            t.push_row(row.to_vec());
        }
        t
    }

    #[test]
    fn output_is_exactly_the_schema_in_order() {
        let input = table_of(
            &["Gender", "Hours_Studied", "Student_Name", "junk"],
            &[&[
                Value::Str("Female".into()),
                Value::Num(4.0),
                Value::Str("Alice".into()),
                Value::Num(9.0),
            ]],
        );
        let out = normalize(&input);
        assert_eq!(out.columns(), column_names().as_slice());
        assert!(!out.has_column("Student_Name"));
        assert!(!out.has_column("junk"));
        assert_eq!(out.get(0, "Gender"), Some(&Value::Str("Female".into())));
        assert_eq!(out.get(0, "Hours_Studied"), Some(&Value::Num(4.0)));
    }

    #[test]
    fn empty_table_normalizes_to_empty_schema_table() {
        let out = normalize(&Table::new(vec![]));
        assert_eq!(out.columns(), column_names().as_slice());
        assert_eq!(out.row_count(), 0);
    }

    #[test]
    fn missing_columns_get_defaults() {
        let input = table_of(&["Hours_Studied"], &[&[Value::Num(3.0)]]);
        let out = normalize(&input);
        assert_eq!(out.get(0, "Attendance"), Some(&Value::Num(0.0)));
        assert_eq!(out.get(0, "Parental_Involvement"), Some(&Value::Str("Medium".into())));
        assert_eq!(out.get(0, "Access_to_Resources"), Some(&Value::Str("Yes".into())));
        assert_eq!(out.get(0, "Internet_Access"), Some(&Value::Str("Yes".into())));
        assert_eq!(out.get(0, "Peer_Influence"), Some(&Value::Str("Neutral".into())));
        assert_eq!(out.get(0, "Learning_Disabilities"), Some(&Value::Str("No".into())));
        assert_eq!(
            out.get(0, "Parental_Education_Level"),
            Some(&Value::Str("Secondary".into()))
        );
        assert_eq!(out.get(0, "Gender"), Some(&Value::Str("Other".into())));
    }

    #[test]
    fn numeric_coercion_failures_become_zero() {
        let input = table_of(
            &["Hours_Studied", "Attendance", "Previous_Scores"],
            &[&[Value::Str("abc".into()), Value::Null, Value::Str(" 72.5 ".into())]],
        );
        let out = normalize(&input);
        assert_eq!(out.get(0, "Hours_Studied"), Some(&Value::Num(0.0)));
        assert_eq!(out.get(0, "Attendance"), Some(&Value::Num(0.0)));
        assert_eq!(out.get(0, "Previous_Scores"), Some(&Value::Num(72.5)));
    }

    #[test]
    fn categorical_nulls_fill_with_mode() {
        let input = table_of(
            &["Internet_Access"],
            &[
                &[Value::Str("Yes".into())],
                &[Value::Str("Yes".into())],
                &[Value::Null],
                &[Value::Str("No".into())],
            ],
        );
        let out = normalize(&input);
        assert_eq!(out.get(2, "Internet_Access"), Some(&Value::Str("Yes".into())));
    }

    #[test]
    fn mode_tie_breaks_on_first_occurrence() {
        let input = table_of(
            &["Gender"],
            &[
                &[Value::Str("Female".into())],
                &[Value::Str("Male".into())],
                &[Value::Null],
            ],
        );
        let out = normalize(&input);
        assert_eq!(out.get(2, "Gender"), Some(&Value::Str("Female".into())));
    }

    #[test]
    fn all_null_categorical_fills_unknown() {
        let input = table_of(&["Peer_Influence"], &[&[Value::Null], &[Value::Null]]);
        let out = normalize(&input);
        assert_eq!(out.get(0, "Peer_Influence"), Some(&Value::Str("Unknown".into())));
        assert_eq!(out.get(1, "Peer_Influence"), Some(&Value::Str("Unknown".into())));
    }

    #[test]
    fn no_missing_values_survive() {
        let input = table_of(
            &["Gender", "Family_Income"],
            &[&[Value::Null, Value::Null], &[Value::Null, Value::Str("x".into())]],
        );
        let out = normalize(&input);
        for row in 0..out.row_count() {
            for col in out.columns().to_vec() {
                assert!(!out.get(row, &col).unwrap().is_null(), "{col} row {row}");
            }
        }
    }

    #[test]
    fn normalize_is_idempotent() {
        let input = table_of(
            &["Hours_Studied", "Gender", "Previous_Scores"],
            &[
                &[Value::Str("5".into()), Value::Null, Value::Str("abc".into())],
                &[Value::Num(2.0), Value::Str("Male".into()), Value::Num(40.0)],
            ],
        );
        let once = normalize(&input);
        let twice = normalize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn missing_columns_reports_in_schema_order() {
        let input = table_of(&["Attendance", "Gender"], &[]);
        let missing = missing_columns(&input);
        assert_eq!(missing[0], "Hours_Studied");
        assert!(missing.contains(&"Previous_Scores"));
        assert!(!missing.contains(&"Gender"));
        assert_eq!(missing.len(), 11);
    }
}
