//! Classifier contract and inference machinery.
//!
//! The model is an opaque artifact behind the [`Classifier`] trait: a
//! required `predict` plus an optional probability capability. The adapter
//! in [`infer`] is the only caller and owns all output-shape defensiveness.

pub mod artifact;
pub mod infer;
pub mod store;

pub use artifact::ModelArtifact;
pub use infer::{infer, Outcome, Prediction};
pub use store::ClassifierStore;

use crate::table::Table;

/// Classifier raised while predicting labels. Fatal for the request that
/// triggered it, never for the process.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct InferenceError(pub String);

/// Binary classifier over a normalized 13-column table.
pub trait Classifier: Send + Sync {
    /// Raw labels, one per row: 1 means Pass.
    fn predict(&self, table: &Table) -> Result<Vec<i64>, InferenceError>;

    /// Probability capability, when the artifact supports it.
    fn proba(&self) -> Option<&dyn PredictProba> {
        None
    }
}

/// Optional probability output: one row of 1 or 2+ confidence values per
/// input row. Shape is normalized by the adapter, not here.
pub trait PredictProba: Send + Sync {
    fn predict_proba(&self, table: &Table) -> Result<Vec<Vec<f64>>, InferenceError>;
}
