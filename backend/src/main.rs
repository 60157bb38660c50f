use std::sync::Arc;

use fair_share_backend::{app, AppState, Config, ResultArchive};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .init();

    let config = Config::from_env()?;
    let listener = TcpListener::bind(config.addr).await?;
    info!(addr = %config.addr, "starting server");

    let state = AppState::new(Arc::new(ResultArchive::new()));
    axum::serve(listener, app(state)).await?;
    Ok(())
}
