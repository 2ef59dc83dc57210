pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::deploys::handlers;
use crate::jira::webhook;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Manual entry
        .route(
            "/api/deploys",
            get(handlers::handle_list_deploys).post(handlers::handle_create_deploy),
        )
        .route("/api/deploys/:id", delete(handlers::handle_delete_deploy))
        // Jira push notifications
        .route("/webhook/jira", post(webhook::handle_jira_webhook))
        .with_state(state)
}
