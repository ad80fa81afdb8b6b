use std::{
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    thread,
    time::Duration,
};

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use futures::future::join_all;
use model::{Artifact, FsModelStore, LinearModel, ModelStore, StoreErr};
use serde_json::Value;
use server::{Dispatcher, DispatcherHandle, router};
use tempfile::tempdir;
use tower::ServiceExt;

/// Wraps the filesystem store, counting loads and making each one slow enough
/// for concurrent first requests to pile up behind it.
struct CountingStore {
    inner: FsModelStore,
    loads: Arc<AtomicUsize>,
    delay: Duration,
}

impl ModelStore for CountingStore {
    type Model = LinearModel;

    fn load(&self, path: &Path) -> Result<LinearModel, StoreErr> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        thread::sleep(self.delay);
        self.inner.load(path)
    }
}

fn save_model(dir: &Path) -> PathBuf {
    let path = dir.join("model.pkl");
    let artifact = Artifact::linear(vec![9449.96], 24848.2).with_feature_names(["YearsExperience"]);
    let model = LinearModel::try_from(artifact).unwrap();
    FsModelStore::new().save(&path, &model).unwrap();
    path
}

fn counting_handle(path: PathBuf) -> (Arc<AtomicUsize>, DispatcherHandle<CountingStore>) {
    let loads = Arc::new(AtomicUsize::new(0));
    let store = CountingStore {
        inner: FsModelStore::new(),
        loads: Arc::clone(&loads),
        delay: Duration::from_millis(100),
    };

    (loads, DispatcherHandle::new(Dispatcher::new(store, path)))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_first_requests_load_once() {
    const REQUESTS: usize = 16;

    let dir = tempdir().unwrap();
    let (loads, handle) = counting_handle(save_model(dir.path()));
    let app = router(handle.clone());

    let tasks = (0..REQUESTS).map(|_| {
        let app = app.clone();
        tokio::spawn(async move {
            let req = Request::post("/predict")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"instances": [1.2, 3.0, 10.6]}"#))
                .unwrap();

            let resp = app.oneshot(req).await.unwrap();
            let status = resp.status();
            let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
                .await
                .unwrap();
            let body: Value = serde_json::from_slice(&bytes).unwrap();
            (status, body)
        })
    });

    let responses: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();

    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert!(handle.is_loaded());

    let (_, first) = &responses[0];
    assert_eq!(first["predictions"].as_array().unwrap().len(), 3);
    for (status, body) in &responses {
        assert_eq!(*status, StatusCode::OK);
        assert_eq!(body, first);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_dispatches_share_the_model() {
    const CALLERS: usize = 8;

    let dir = tempdir().unwrap();
    let (loads, handle) = counting_handle(save_model(dir.path()));
    let payload = serde_json::json!({"instances": [[2.0], [4.0]]});

    let tasks = (0..CALLERS).map(|_| {
        let handle = handle.clone();
        let payload = payload.clone();
        tokio::spawn(async move { handle.dispatch(&payload).await })
    });

    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|r| r.unwrap().unwrap())
        .collect();

    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert!(results.iter().all(|y| y == &results[0]));

    handle.reset();
    handle.dispatch(&payload).await.unwrap();
    assert_eq!(loads.load(Ordering::SeqCst), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn warm_up_loads_before_the_first_request() {
    let dir = tempdir().unwrap();
    let (loads, handle) = counting_handle(save_model(dir.path()));

    handle.warm_up().await.unwrap();
    assert!(handle.is_loaded());

    handle
        .dispatch(&serde_json::json!({"instances": [1]}))
        .await
        .unwrap();
    assert_eq!(loads.load(Ordering::SeqCst), 1);
}
