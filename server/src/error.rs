use std::{
    error::Error,
    fmt::{self, Display},
    num::ParseIntError,
};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use model::{PredictErr, StoreErr};
use serde::Serialize;

/// The service's result type.
pub type Result<T> = std::result::Result<T, ServiceErr>;

/// Every way a prediction request can fail.
#[derive(Debug)]
pub enum ServiceErr {
    /// The body has no `instances` field, or it's `null`.
    MissingInstances,
    /// The `instances` field can't be turned into a numeric matrix.
    InvalidInput(String),
    /// The model artifact is missing or inaccessible.
    ModelNotFound(StoreErr),
    /// The model artifact exists but is malformed.
    ModelCorrupt(StoreErr),
    /// The regression engine rejected the normalized input.
    PredictionFailure(PredictErr),
}

impl ServiceErr {
    /// Returns the HTTP status this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingInstances | Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::ModelNotFound(_) | Self::ModelCorrupt(_) | Self::PredictionFailure(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl Display for ServiceErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingInstances => f.write_str("Missing 'instances' in JSON body"),
            Self::InvalidInput(msg) => write!(f, "Invalid 'instances': {msg}"),
            Self::ModelNotFound(e) | Self::ModelCorrupt(e) => write!(f, "Model unavailable: {e}"),
            Self::PredictionFailure(e) => write!(f, "Prediction failed: {e}"),
        }
    }
}

impl Error for ServiceErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ModelNotFound(e) | Self::ModelCorrupt(e) => Some(e),
            Self::PredictionFailure(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreErr> for ServiceErr {
    fn from(value: StoreErr) -> Self {
        if value.is_not_found() {
            Self::ModelNotFound(value)
        } else {
            Self::ModelCorrupt(value)
        }
    }
}

impl From<PredictErr> for ServiceErr {
    fn from(value: PredictErr) -> Self {
        Self::PredictionFailure(value)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ServiceErr {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };

        (self.status(), Json(body)).into_response()
    }
}

/// Startup failures while reading the environment.
#[derive(Debug)]
pub enum ConfigErr {
    InvalidPort {
        value: String,
        source: ParseIntError,
    },
    InvalidFlag {
        key: &'static str,
        value: String,
    },
}

impl Display for ConfigErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPort { value, source } => write!(f, "invalid PORT '{value}': {source}"),
            Self::InvalidFlag { key, value } => {
                write!(f, "invalid {key} '{value}': expected true/false")
            }
        }
    }
}

impl Error for ConfigErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidPort { source, .. } => Some(source),
            _ => None,
        }
    }
}
