//! Batch Result Writer.
//!
//! Scores a whole uploaded table: synthesizes row identity, runs the
//! inference adapter when a classifier is loaded, falls back to the
//! rule-based heuristic otherwise, and tallies Pass/Fail counts off the
//! final `result` column.

use crate::model::{self, Classifier, Outcome};
use crate::schema::{self, FIRST_STUDENT_ID, PROBABILITY, RESULT, STUDENT_ID, STUDENT_NAME};
use crate::table::{Table, Value};

#[derive(Debug)]
pub struct ScoredTable {
    pub table: Table,
    pub pass_count: usize,
    pub fail_count: usize,
}

impl ScoredTable {
    pub fn row_count(&self) -> usize {
        self.table.row_count()
    }
}

/// Synthesize `student_id` as the leading column when absent, sequential
/// from 1001 in input row order.
pub fn ensure_student_ids(table: &mut Table) {
    if table.has_column(STUDENT_ID) {
        return;
    }
    let ids = (0..table.row_count())
        .map(|i| Value::Str((FIRST_STUDENT_ID + i as u32).to_string()))
        .collect();
    table.insert_column_front(STUDENT_ID, ids);
}

/// Synthesize `Student_Name` (`Student_<idx>`, 0-based) when absent.
pub fn ensure_student_names(table: &mut Table) {
    if table.has_column(STUDENT_NAME) {
        return;
    }
    let names = (0..table.row_count())
        .map(|i| Value::Str(format!("Student_{i}")))
        .collect();
    table.push_column(STUDENT_NAME, names);
}

/// Rule-based fallback: Pass iff Previous_Scores >= 50 or Hours_Studied
/// >= 5. A missing or unparseable value fails that disjunct rather than
/// erroring.
pub fn heuristic_outcome(table: &Table, row: usize) -> Outcome {
    let scores = table.get(row, "Previous_Scores").and_then(Value::as_num);
    let hours = table.get(row, "Hours_Studied").and_then(Value::as_num);
    let pass = scores.map(|s| s >= 50.0).unwrap_or(false)
        || hours.map(|h| h >= 5.0).unwrap_or(false);
    if pass {
        Outcome::Pass
    } else {
        Outcome::Fail
    }
}

/// Score a table with the classifier when available, heuristically
/// otherwise. The returned counts are always a straight tally of the
/// `result` column.
pub fn score_table(mut table: Table, classifier: Option<&dyn Classifier>) -> ScoredTable {
    ensure_student_ids(&mut table);
    ensure_student_names(&mut table);

    match classifier {
        Some(clf) => {
            let normalized = schema::normalize(&table);
            match model::infer(clf, &normalized) {
                Ok(predictions) => {
                    let results = predictions
                        .iter()
                        .map(|p| Value::Str(p.label.as_str().to_string()))
                        .collect();
                    let probabilities = predictions
                        .iter()
                        .map(|p| Value::Num(p.probability))
                        .collect();
                    set_or_push_column(&mut table, RESULT, results);
                    set_or_push_column(&mut table, PROBABILITY, probabilities);
                }
                Err(e) => {
                    // Degrade to the heuristic instead of aborting the batch.
                    tracing::warn!("batch inference failed ({}), falling back to heuristic", e);
                    apply_heuristic(&mut table, true);
                }
            }
        }
        None => apply_heuristic(&mut table, false),
    }

    let (pass_count, fail_count) = tally(&table);
    ScoredTable { table, pass_count, fail_count }
}

/// Heuristic-score every row. With `overwrite` false, a table that already
/// carries a `result` column is left as-is (re-uploaded scored data).
fn apply_heuristic(table: &mut Table, overwrite: bool) {
    if table.has_column(RESULT) && !overwrite {
        return;
    }
    // Heuristic results carry no probability; a stale column from a
    // previously scored table must not survive next to them.
    if overwrite {
        table.remove_column(PROBABILITY);
    }
    let results = (0..table.row_count())
        .map(|row| Value::Str(heuristic_outcome(table, row).as_str().to_string()))
        .collect();
    set_or_push_column(table, RESULT, results);
}

fn set_or_push_column(table: &mut Table, name: &str, values: Vec<Value>) {
    if table.has_column(name) {
        for (row, value) in values.into_iter().enumerate() {
            table.set(row, name, value);
        }
    } else {
        table.push_column(name, values);
    }
}

fn tally(table: &Table) -> (usize, usize) {
    let mut pass = 0usize;
    let mut fail = 0usize;
    for row in 0..table.row_count() {
        match table.get(row, RESULT) {
            Some(Value::Str(s)) if s == "Pass" => pass += 1,
            _ => fail += 1,
        }
    }
    (pass, fail)
}
