use std::{
    error::Error,
    fmt::{self, Display},
    io,
    path::PathBuf,
};

/// Failures while loading or saving a model artifact.
#[derive(Debug)]
pub enum StoreErr {
    /// There's no artifact at the given path.
    NotFound { path: PathBuf },
    /// The artifact exists but couldn't be read or written.
    Unreadable { path: PathBuf, source: io::Error },
    /// The artifact was read but it isn't a valid model.
    Corrupt { path: PathBuf, reason: String },
}

impl StoreErr {
    /// Whether this error means the artifact is missing or inaccessible, as opposed to malformed.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Unreadable { .. })
    }
}

impl Display for StoreErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { path } => write!(f, "model file not found at {}", path.display()),
            Self::Unreadable { path, source } => {
                write!(f, "cannot access model file {}: {source}", path.display())
            }
            Self::Corrupt { path, reason } => {
                write!(f, "model file {} is corrupt: {reason}", path.display())
            }
        }
    }
}

impl Error for StoreErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Unreadable { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Failures raised by the regression engine while predicting.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictErr {
    ShapeMismatch {
        got: usize,
        expected: usize,
    },
    SchemaMismatch {
        got: Vec<String>,
        expected: Vec<String>,
    },
}

impl Display for PredictErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShapeMismatch { got, expected } => write!(
                f,
                "input has {got} feature(s) but the model expects {expected}"
            ),
            Self::SchemaMismatch { got, expected } => write!(
                f,
                "input columns {got:?} don't match the trained feature names {expected:?}"
            ),
        }
    }
}

impl Error for PredictErr {}
