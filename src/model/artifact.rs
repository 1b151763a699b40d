//! The serialized classifier artifact.
//!
//! A retrain produces a JSON file describing a standardized logistic
//! model: per-numeric mean/std scaling, per-categorical one-hot
//! vocabularies (unknown categories encode to all zeros), a weight vector
//! over the expanded design matrix and an intercept. The `proba` flag
//! records whether the trainer fit calibrated probabilities; without it
//! the artifact only exposes labels.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::schema::{self, FieldKind};
use crate::table::Table;

use super::{Classifier, InferenceError, PredictProba};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scaling {
    pub mean: f64,
    pub std: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Fit-time column order; must match the feature schema.
    pub columns: Vec<String>,
    pub numeric: BTreeMap<String, Scaling>,
    pub categories: BTreeMap<String, Vec<String>>,
    pub weights: Vec<f64>,
    pub intercept: f64,
    #[serde(default = "default_proba")]
    pub proba: bool,
}

fn default_proba() -> bool {
    true
}

impl ModelArtifact {
    pub fn load(path: &Path) -> Result<Self, InferenceError> {
        let bytes = fs::read(path)
            .map_err(|e| InferenceError(format!("could not read model artifact: {e}")))?;
        let artifact: ModelArtifact = serde_json::from_slice(&bytes)
            .map_err(|e| InferenceError(format!("malformed model artifact: {e}")))?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// Sanity-check the artifact against the feature schema before use.
    pub fn validate(&self) -> Result<(), InferenceError> {
        let expected = schema::column_names();
        if self.columns != expected {
            return Err(InferenceError(format!(
                "artifact columns do not match the feature schema: {:?}",
                self.columns
            )));
        }
        if self.weights.len() != self.design_width() {
            return Err(InferenceError(format!(
                "artifact has {} weights for a design width of {}",
                self.weights.len(),
                self.design_width()
            )));
        }
        Ok(())
    }

    fn design_width(&self) -> usize {
        schema::SCHEMA
            .iter()
            .map(|f| match f.kind {
                FieldKind::Numeric => 1,
                FieldKind::Categorical => {
                    self.categories.get(f.name).map(Vec::len).unwrap_or(0)
                }
            })
            .sum()
    }

    /// Pass probability for one row of the normalized table.
    fn score_row(&self, table: &Table, row: usize) -> Result<f64, InferenceError> {
        let mut z = self.intercept;
        let mut w = 0usize;

        for field in &schema::SCHEMA {
            let value = table
                .get(row, field.name)
                .ok_or_else(|| InferenceError(format!("missing column {}", field.name)))?;
            match field.kind {
                FieldKind::Numeric => {
                    let x = value.as_num().unwrap_or(0.0);
                    let s = self
                        .numeric
                        .get(field.name)
                        .cloned()
                        .unwrap_or(Scaling { mean: 0.0, std: 1.0 });
                    let std = if s.std.abs() < 1e-12 { 1.0 } else { s.std };
                    z += self.weights[w] * ((x - s.mean) / std);
                    w += 1;
                }
                FieldKind::Categorical => {
                    let text = value.to_text();
                    if let Some(vocab) = self.categories.get(field.name) {
                        for (i, cat) in vocab.iter().enumerate() {
                            if cat == &text {
                                z += self.weights[w + i];
                            }
                        }
                        w += vocab.len();
                    }
                }
            }
        }
        Ok(sigmoid(z))
    }

    fn scores(&self, table: &Table) -> Result<Vec<f64>, InferenceError> {
        (0..table.row_count()).map(|r| self.score_row(table, r)).collect()
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl Classifier for ModelArtifact {
    fn predict(&self, table: &Table) -> Result<Vec<i64>, InferenceError> {
        Ok(self
            .scores(table)?
            .into_iter()
            .map(|p| if p >= 0.5 { 1 } else { 0 })
            .collect())
    }

    fn proba(&self) -> Option<&dyn PredictProba> {
        if self.proba {
            Some(self)
        } else {
            None
        }
    }
}

impl PredictProba for ModelArtifact {
    fn predict_proba(&self, table: &Table) -> Result<Vec<Vec<f64>>, InferenceError> {
        Ok(self
            .scores(table)?
            .into_iter()
            .map(|p| vec![1.0 - p, p])
            .collect())
    }
}
