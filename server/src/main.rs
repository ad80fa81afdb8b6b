use log::{info, warn};
use model::FsModelStore;
use tokio::{net::TcpListener, signal};

use server::{Dispatcher, DispatcherHandle, ServiceConfig, router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = ServiceConfig::from_env()?;
    let dispatcher = Dispatcher::new(FsModelStore::new(), config.model_path().clone());
    info!("serving model at {}", dispatcher.model_path().display());
    let handle = DispatcherHandle::new(dispatcher);

    if config.preload() {
        if let Err(e) = handle.warm_up().await {
            warn!("preload failed, will retry on the first request: {e}");
        }
    }

    let addr = config.addr();
    let list = TcpListener::bind(&addr).await?;
    info!("listening at {addr}");

    axum::serve(list, router(handle))
        .with_graceful_shutdown(shutdown())
        .await?;

    info!("wrapping up, bye");
    Ok(())
}

async fn shutdown() {
    match signal::ctrl_c().await {
        Ok(()) => info!("received SIGINT, shutting down"),
        Err(e) => {
            warn!("failed to listen for SIGINT: {e}");
            std::future::pending::<()>().await;
        }
    }
}
