//! Inference Adapter.
//!
//! Invokes a classifier over a normalized table and turns its output into
//! `(label, probability)` pairs, one per row, in input order. Probability
//! extraction is best-effort and never fails a request: any missing
//! capability, malformed shape or proba error degrades to the step
//! function (1.0 for Pass, 0.0 for Fail). Only a failure of `predict`
//! itself propagates.

use serde::Serialize;

use crate::table::Table;

use super::{Classifier, InferenceError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Pass,
    Fail,
}

impl Outcome {
    pub fn from_raw(label: i64) -> Self {
        if label == 1 {
            Outcome::Pass
        } else {
            Outcome::Fail
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Pass => "Pass",
            Outcome::Fail => "Fail",
        }
    }

    /// Step-function confidence used when no real probability exists.
    pub fn step_probability(&self) -> f64 {
        match self {
            Outcome::Pass => 1.0,
            Outcome::Fail => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: Outcome,
    pub probability: f64,
}

/// Run the classifier over the whole table.
pub fn infer(
    classifier: &dyn Classifier,
    table: &Table,
) -> Result<Vec<Prediction>, InferenceError> {
    let raw = classifier.predict(table)?;
    if raw.len() != table.row_count() {
        return Err(InferenceError(format!(
            "classifier returned {} labels for {} rows",
            raw.len(),
            table.row_count()
        )));
    }

    let probas = match classifier.proba() {
        Some(p) => match p.predict_proba(table) {
            Ok(rows) => Some(rows),
            Err(e) => {
                tracing::debug!("probability extraction failed ({}), using step fallback", e);
                None
            }
        },
        None => None,
    };

    Ok(raw
        .into_iter()
        .enumerate()
        .map(|(i, r)| {
            let label = Outcome::from_raw(r);
            let probability = probas
                .as_ref()
                .and_then(|rows| rows.get(i))
                .and_then(|row| positive_class_probability(row))
                .unwrap_or_else(|| label.step_probability());
            Prediction { label, probability }
        })
        .collect())
}

/// Probability of the positive class from one proba row: column 1 when two
/// or more columns exist, the single value when there is exactly one.
fn positive_class_probability(row: &[f64]) -> Option<f64> {
    match row.len() {
        0 => None,
        1 => Some(row[0]),
        _ => Some(row[1]),
    }
    .filter(|p| p.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PredictProba;
    use crate::table::{Table, Value};

    fn one_row_table() -> Table {
        let mut t = Table::new(vec!["x".into()]);
        t.push_row(vec![Value::Num(1.0)]);
        t
    }

    struct Stub {
        labels: Vec<i64>,
        proba: Option<Result<Vec<Vec<f64>>, String>>,
    }

    impl Classifier for Stub {
        fn predict(&self, _: &Table) -> Result<Vec<i64>, InferenceError> {
            Ok(self.labels.clone())
        }

        fn proba(&self) -> Option<&dyn PredictProba> {
            self.proba.as_ref().map(|_| self as &dyn PredictProba)
        }
    }

    impl PredictProba for Stub {
        fn predict_proba(&self, _: &Table) -> Result<Vec<Vec<f64>>, InferenceError> {
            match self.proba.as_ref().unwrap() {
                Ok(rows) => Ok(rows.clone()),
                Err(msg) => Err(InferenceError(msg.clone())),
            }
        }
    }

    struct Exploding;

    impl Classifier for Exploding {
        fn predict(&self, _: &Table) -> Result<Vec<i64>, InferenceError> {
            Err(InferenceError("boom".into()))
        }
    }

    #[test]
    fn two_column_proba_uses_positive_class() {
        let clf = Stub { labels: vec![1], proba: Some(Ok(vec![vec![0.3, 0.7]])) };
        let out = infer(&clf, &one_row_table()).unwrap();
        assert_eq!(out[0].label, Outcome::Pass);
        assert!((out[0].probability - 0.7).abs() < 1e-12);
    }

    #[test]
    fn single_column_proba_is_used_directly() {
        let clf = Stub { labels: vec![1], proba: Some(Ok(vec![vec![0.8]])) };
        let out = infer(&clf, &one_row_table()).unwrap();
        assert!((out[0].probability - 0.8).abs() < 1e-12);
    }

    #[test]
    fn missing_capability_steps_on_label() {
        let pass = Stub { labels: vec![1], proba: None };
        assert_eq!(infer(&pass, &one_row_table()).unwrap()[0].probability, 1.0);

        let fail = Stub { labels: vec![0], proba: None };
        assert_eq!(infer(&fail, &one_row_table()).unwrap()[0].probability, 0.0);
    }

    #[test]
    fn proba_error_is_swallowed() {
        let clf = Stub { labels: vec![0], proba: Some(Err("shape mismatch".into())) };
        let out = infer(&clf, &one_row_table()).unwrap();
        assert_eq!(out[0].probability, 0.0);
    }

    #[test]
    fn empty_proba_row_steps_on_label() {
        let clf = Stub { labels: vec![1], proba: Some(Ok(vec![vec![]])) };
        assert_eq!(infer(&clf, &one_row_table()).unwrap()[0].probability, 1.0);
    }

    #[test]
    fn short_proba_output_degrades_only_missing_rows() {
        let mut t = Table::new(vec!["x".into()]);
        t.push_row(vec![Value::Num(1.0)]);
        t.push_row(vec![Value::Num(2.0)]);
        let clf = Stub { labels: vec![1, 0], proba: Some(Ok(vec![vec![0.2, 0.9]])) };
        let out = infer(&clf, &t).unwrap();
        assert!((out[0].probability - 0.9).abs() < 1e-12);
        assert_eq!(out[1].probability, 0.0);
    }

    #[test]
    fn predict_failure_propagates() {
        assert!(infer(&Exploding, &one_row_table()).is_err());
    }

    #[test]
    fn label_count_mismatch_is_an_error() {
        let clf = Stub { labels: vec![1, 1], proba: None };
        assert!(infer(&clf, &one_row_table()).is_err());
    }
}
