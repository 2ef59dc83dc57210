use std::sync::Arc;

use crate::config::Config;
use crate::deploys::store::DeployStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Deploy persistence. Default: `PgDeployStore` over the shared pool.
    pub store: Arc<dyn DeployStore>,
    pub config: Config,
}
