pub mod aligner;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handle;
pub mod normalizer;
pub mod routes;
mod slot;

pub use config::ServiceConfig;
pub use dispatcher::Dispatcher;
pub use error::{ConfigErr, ServiceErr};
pub use handle::DispatcherHandle;
pub use routes::router;
pub use slot::ModelSlot;
