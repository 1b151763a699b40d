//! Swappable classifier handle.
//!
//! Readers-writer discipline: requests clone the `Arc` and keep using the
//! artifact they started with; a retrain swaps the slot exclusively for a
//! brief moment and subsequent requests pick up the new artifact.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use super::{Classifier, InferenceError, ModelArtifact};

pub struct ClassifierStore {
    model_path: PathBuf,
    current: RwLock<Option<Arc<dyn Classifier>>>,
}

impl ClassifierStore {
    /// Create the store and try to load the artifact from disk. A missing
    /// or unreadable artifact is not fatal: the service runs model-less
    /// and batch scoring falls back to the heuristic.
    pub fn open(model_path: PathBuf) -> Self {
        let store = Self {
            model_path,
            current: RwLock::new(None),
        };
        match store.reload() {
            Ok(true) => tracing::info!("classifier loaded from {:?}", store.model_path),
            Ok(false) => tracing::info!("no classifier artifact at {:?}, serving model-less", store.model_path),
            Err(e) => tracing::warn!("could not load classifier: {}", e),
        }
        store
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Current classifier, if any. The clone stays valid across a swap.
    pub fn current(&self) -> Option<Arc<dyn Classifier>> {
        self.current.read().clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.current.read().is_some()
    }

    /// Re-read the artifact from disk and swap it in. `Ok(false)` means
    /// there is no artifact file (the slot is left untouched).
    pub fn reload(&self) -> Result<bool, InferenceError> {
        if !self.model_path.exists() {
            return Ok(false);
        }
        let artifact = ModelArtifact::load(&self.model_path)?;
        self.swap(Arc::new(artifact));
        Ok(true)
    }

    pub fn swap(&self, classifier: Arc<dyn Classifier>) {
        *self.current.write() = Some(classifier);
    }
}
