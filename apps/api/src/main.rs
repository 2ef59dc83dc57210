mod config;
mod db;
mod deploys;
mod errors;
mod jira;
mod models;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::deploys::store::{DeployStore, PgDeployStore};
use crate::jira::client::JiraClient;
use crate::jira::poller::JiraPoller;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing DATABASE_URL)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting deploy tracker v{}", env!("CARGO_PKG_VERSION"));

    // Schema must exist before the listener or the poller touch the table
    let pool = create_pool(&config.database_url, config.is_production()).await?;
    let store: Arc<dyn DeployStore> = Arc::new(PgDeployStore::new(pool));
    store.ensure_schema().await?;

    warn_on_status_mismatch(&config);

    // Start the Jira poller
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poller = JiraPoller::new(
        Arc::new(JiraClient::new()?),
        store.clone(),
        config.jira.clone(),
    );
    let poller_handle = poller.spawn(shutdown_rx);

    let state = AppState {
        store,
        config: config.clone(),
    };

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    shutdown_tx.send(true).ok();
    poller_handle.await?;
    info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// The poller and the webhook default to different target statuses. When both
/// paths are live and still disagree, the operator most likely forgot one.
fn warn_on_status_mismatch(config: &Config) {
    let jira = &config.jira;
    if jira.credentials().is_some() && jira.poll_status != jira.webhook_status {
        warn!(
            "Jira poller targets status '{}' but the webhook targets '{}'",
            jira.poll_status, jira.webhook_status
        );
    }
}
