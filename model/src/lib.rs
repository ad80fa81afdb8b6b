pub mod artifact;
pub mod engine;
pub mod error;
pub mod features;
pub mod store;

pub use artifact::{Artifact, FORMAT_VERSION};
pub use engine::{LinearModel, Regressor};
pub use error::{PredictErr, StoreErr};
pub use features::Features;
pub use store::{FsModelStore, ModelStore};
