use std::{ops::Deref, sync::Arc};

use model::ModelStore;
use serde_json::Value;
use tokio::task;

use crate::{dispatcher::Dispatcher, error::Result};

/// The shared, cloneable interface to a `Dispatcher`.
///
/// It bridges the async runtime with the blocking model loading and prediction of the
/// `Dispatcher`, so it requires a multi-threaded runtime.
pub struct DispatcherHandle<S: ModelStore>(Arc<Dispatcher<S>>);

impl<S: ModelStore> Clone for DispatcherHandle<S> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<S: ModelStore> Deref for DispatcherHandle<S> {
    type Target = Dispatcher<S>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S: ModelStore> DispatcherHandle<S> {
    pub fn new(dispatcher: Dispatcher<S>) -> Self {
        Self(Arc::new(dispatcher))
    }

    /// Async call to the synchronous implementation of `Dispatcher::dispatch`.
    ///
    /// # Arguments
    /// * `payload` - The request body.
    pub async fn dispatch(&self, payload: &Value) -> Result<Vec<f64>> {
        task::block_in_place(|| self.0.dispatch(payload))
    }

    /// Loads the model ahead of the first request.
    pub async fn warm_up(&self) -> Result<()> {
        task::block_in_place(|| self.0.model().map(|_| ()))
    }
}
