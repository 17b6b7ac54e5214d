mod config;
mod routes;
mod services;
mod state;

use std::net::SocketAddr;
use std::process::ExitCode;

use tokio::net::TcpListener;

use crate::config::Config;
use crate::services::listener::{ListenerError, ListenerHandle, Supervisor};
use crate::services::moderation_store::{FileModerationStore, load_or_empty};
use crate::services::relay::Hub;

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Listener(#[from] ListenerError),
}

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();
    tracing_subscriber::fmt::init();
    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, ".env present but unreadable"),
    }

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "livewall failed to start");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), StartupError> {
    let config = Config::from_env()?;

    let store = FileModerationStore::new(&config.moderation_list_path);
    tracing::info!(path = %store.path().display(), "moderation list store");
    let banned = load_or_empty(&store).await;

    let (hub, _hub_task) = Hub::new(banned, Box::new(store)).spawn(config.hub_queue_capacity);
    let (listener, requests) = ListenerHandle::channel();
    let state = state::AppState::new(hub.clone(), listener, config.client_queue_capacity);
    let app = routes::app(state, &config.public_dir);

    let addr = SocketAddr::new(config.bind_addr, config.port);
    let initial = TcpListener::bind(addr).await.map_err(|source| ListenerError::Bind { addr, source })?;

    tracing::info!(%addr, public_dir = %config.public_dir.display(), "livewall listening");
    Supervisor::new(config.bind_addr, app, hub).run(initial, requests).await?;
    Ok(())
}
