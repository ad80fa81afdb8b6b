use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use log::{debug, info};
use model::{Features, ModelStore, Regressor};
use serde_json::Value;

use crate::{aligner, error::Result, normalizer, slot::ModelSlot};

/// Owns the model store and the lazily loaded model, and runs predictions through it.
pub struct Dispatcher<S: ModelStore> {
    store: S,
    model_path: PathBuf,
    slot: ModelSlot<S::Model>,
}

impl<S: ModelStore> Dispatcher<S> {
    /// Creates a new `Dispatcher`, nothing is loaded until the first prediction.
    ///
    /// # Arguments
    /// * `store` - Where models are loaded from.
    /// * `model_path` - The artifact to load.
    pub fn new(store: S, model_path: impl Into<PathBuf>) -> Self {
        Self {
            store,
            model_path: model_path.into(),
            slot: ModelSlot::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn is_loaded(&self) -> bool {
        self.slot.is_filled()
    }

    /// Drops the cached model so the next request loads it again.
    pub fn reset(&self) {
        self.slot.reset();
    }

    /// Returns the cached model, loading it from the store on first use.
    ///
    /// # Returns
    /// The shared model, or `ModelNotFound`/`ModelCorrupt` if loading failed. Failures
    /// aren't cached.
    pub fn model(&self) -> Result<Arc<S::Model>> {
        let model = self.slot.get_or_try_init(|| {
            info!("no model cached, loading {}", self.model_path.display());
            self.store.load(&self.model_path)
        })?;

        Ok(model)
    }

    /// Runs `model` over `features` and flattens the output.
    ///
    /// # Returns
    /// One prediction per row, in row order.
    pub fn predict(&self, model: &S::Model, features: &Features) -> Result<Vec<f64>> {
        let predictions = model.predict(features)?;
        Ok(predictions.to_vec())
    }

    /// Handles a whole request body: normalize, load, align and predict.
    ///
    /// The body is normalized first, a malformed request never triggers a model load.
    pub fn dispatch(&self, payload: &Value) -> Result<Vec<f64>> {
        let values = normalizer::normalize(payload)?;
        let model = self.model()?;
        let features = aligner::align(values, model.as_ref());

        debug!(
            "predicting {} sample(s) with {} feature(s)",
            features.nrows(),
            features.ncols()
        );

        self.predict(&model, &features)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        path::Path,
        sync::atomic::{AtomicUsize, Ordering},
    };

    use model::{Artifact, LinearModel, StoreErr};
    use serde_json::json;

    use super::*;
    use crate::error::ServiceErr;

    /// Serves a fixed model from memory and counts the loads.
    struct MemoryStore {
        artifact: Option<Artifact>,
        loads: AtomicUsize,
    }

    impl MemoryStore {
        fn new(artifact: Option<Artifact>) -> Self {
            Self {
                artifact,
                loads: AtomicUsize::new(0),
            }
        }
    }

    impl ModelStore for MemoryStore {
        type Model = LinearModel;

        fn load(&self, path: &Path) -> std::result::Result<LinearModel, StoreErr> {
            self.loads.fetch_add(1, Ordering::SeqCst);

            let artifact = self.artifact.clone().ok_or_else(|| StoreErr::NotFound {
                path: path.to_path_buf(),
            })?;

            LinearModel::try_from(artifact).map_err(|reason| StoreErr::Corrupt {
                path: path.to_path_buf(),
                reason,
            })
        }
    }

    fn dispatcher() -> Dispatcher<MemoryStore> {
        let artifact = Artifact::linear(vec![2.0], 1.0).with_feature_names(["YearsExperience"]);
        Dispatcher::new(MemoryStore::new(Some(artifact)), "models/model.pkl")
    }

    #[test]
    fn loads_lazily_and_once() {
        let dispatcher = dispatcher();
        assert!(!dispatcher.is_loaded());

        let a = dispatcher.dispatch(&json!({"instances": [1, 2, 3]})).unwrap();
        let b = dispatcher.dispatch(&json!({"instances": [1, 2, 3]})).unwrap();

        assert_eq!(a, vec![3.0, 5.0, 7.0]);
        assert_eq!(a, b);
        assert!(dispatcher.is_loaded());
        assert_eq!(dispatcher.store().loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn bad_input_does_not_load() {
        let dispatcher = dispatcher();

        let err = dispatcher.dispatch(&json!({})).unwrap_err();

        assert!(matches!(err, ServiceErr::MissingInstances));
        assert!(!dispatcher.is_loaded());
        assert_eq!(dispatcher.store().loads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn missing_model_is_retried() {
        let dispatcher = Dispatcher::new(MemoryStore::new(None), "nope.pkl");

        for _ in 0..2 {
            let err = dispatcher.dispatch(&json!({"instances": [1]})).unwrap_err();
            assert!(matches!(err, ServiceErr::ModelNotFound(_)));
        }

        assert_eq!(dispatcher.store().loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn corrupt_model_is_reported() {
        let dispatcher = Dispatcher::new(
            MemoryStore::new(Some(Artifact::linear(vec![], 0.0))),
            "models/model.pkl",
        );

        let err = dispatcher.dispatch(&json!({"instances": [1]})).unwrap_err();
        assert!(matches!(err, ServiceErr::ModelCorrupt(_)));
    }

    #[test]
    fn reset_reloads() {
        let dispatcher = dispatcher();
        dispatcher.dispatch(&json!({"instances": [1]})).unwrap();

        dispatcher.reset();
        assert!(!dispatcher.is_loaded());

        dispatcher.dispatch(&json!({"instances": [1]})).unwrap();
        assert_eq!(dispatcher.store().loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn width_mismatch_is_a_prediction_failure() {
        let dispatcher = dispatcher();

        let err = dispatcher
            .dispatch(&json!({"instances": [[1, 2]]}))
            .unwrap_err();

        assert!(matches!(err, ServiceErr::PredictionFailure(_)));
        assert!(dispatcher.is_loaded());
    }

    #[test]
    fn empty_instances_predict_nothing() {
        let dispatcher = dispatcher();
        let predictions = dispatcher.dispatch(&json!({"instances": []})).unwrap();
        assert!(predictions.is_empty());
    }
}
