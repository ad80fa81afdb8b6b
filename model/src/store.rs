use std::{
    fs, io,
    path::Path,
};

use log::info;

use crate::{
    artifact::Artifact,
    engine::{LinearModel, Regressor},
    error::StoreErr,
};

/// Loads fitted models from wherever they are persisted.
pub trait ModelStore: Send + Sync {
    type Model: Regressor + 'static;

    /// Loads the model stored at `path`.
    ///
    /// # Arguments
    /// * `path` - The location of the serialized artifact.
    ///
    /// # Returns
    /// The fitted model, or a `StoreErr` if it's missing or malformed.
    fn load(&self, path: &Path) -> Result<Self::Model, StoreErr>;
}

/// A `ModelStore` backed by JSON artifacts on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsModelStore;

impl FsModelStore {
    pub fn new() -> Self {
        Self
    }

    /// Writes `model` to `path`, creating any missing parent directory.
    ///
    /// # Arguments
    /// * `path` - Where to write the artifact.
    /// * `model` - The model to persist.
    ///
    /// # Returns
    /// A `StoreErr::Unreadable` if the file couldn't be written.
    pub fn save(&self, path: &Path, model: &LinearModel) -> Result<(), StoreErr> {
        let unwritable = |source| StoreErr::Unreadable {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(unwritable)?;
        }

        let json = serde_json::to_vec_pretty(&Artifact::from(model))
            .map_err(|e| unwritable(io::Error::other(e)))?;

        fs::write(path, json).map_err(unwritable)?;
        info!("saved model to {}", path.display());
        Ok(())
    }
}

impl ModelStore for FsModelStore {
    type Model = LinearModel;

    fn load(&self, path: &Path) -> Result<LinearModel, StoreErr> {
        let corrupt = |reason: String| StoreErr::Corrupt {
            path: path.to_path_buf(),
            reason,
        };

        let bytes = fs::read(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => StoreErr::NotFound {
                path: path.to_path_buf(),
            },
            _ => StoreErr::Unreadable {
                path: path.to_path_buf(),
                source,
            },
        })?;

        let artifact: Artifact =
            serde_json::from_slice(&bytes).map_err(|e| corrupt(e.to_string()))?;

        let model = LinearModel::try_from(artifact).map_err(corrupt)?;

        info!(
            "loaded model from {} ({} feature(s))",
            path.display(),
            model.n_features()
        );

        Ok(model)
    }
}
