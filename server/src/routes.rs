use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    routing::{get, post},
};
use log::{debug, warn};
use model::ModelStore;
use serde::Serialize;
use serde_json::{Map, Value, error::Category, json};

use crate::{error::ServiceErr, handle::DispatcherHandle};

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

#[derive(Serialize)]
struct Predictions {
    predictions: Vec<f64>,
}

/// Builds the service's router: `GET /`, `GET /health` and `POST /predict`.
///
/// # Arguments
/// * `handle` - The dispatcher shared by every request.
pub fn router<S: ModelStore + 'static>(handle: DispatcherHandle<S>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/predict", post(predict::<S>))
        .with_state(handle)
}

async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn index() -> Json<Value> {
    Json(json!({
        "message": "ML prediction service is running",
        "endpoints": {
            "GET /health": "health check",
            "POST /predict": "send JSON with 'instances' to get predictions",
        },
    }))
}

async fn predict<S: ModelStore + 'static>(
    State(handle): State<DispatcherHandle<S>>,
    body: Bytes,
) -> Result<Json<Predictions>, ServiceErr> {
    let result = match parse_body(&body) {
        Ok(payload) => handle.dispatch(&payload).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(predictions) => Ok(Json(Predictions { predictions })),
        Err(e) => {
            warn!("prediction request failed: {e}");
            Err(e)
        }
    }
}

/// Anything that isn't JSON reads as an empty object, so it's reported as missing `instances`.
///
/// # Errors
/// `InvalidInput` for well-formed JSON holding a number that doesn't fit an `f64`.
fn parse_body(body: &[u8]) -> Result<Value, ServiceErr> {
    match serde_json::from_slice(body) {
        Ok(payload) => Ok(payload),
        Err(e) if is_not_json(&e) => {
            debug!("unparsable request body: {e}");
            Ok(Value::Object(Map::new()))
        }
        Err(e) => Err(ServiceErr::InvalidInput(e.to_string())),
    }
}

fn is_not_json(e: &serde_json::Error) -> bool {
    match e.classify() {
        Category::Eof => true,
        // Out of range numbers are reported as syntax errors too.
        Category::Syntax => !e.to_string().starts_with("number out of range"),
        Category::Data | Category::Io => false,
    }
}
