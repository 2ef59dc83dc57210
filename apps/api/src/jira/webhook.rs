use anyhow::Context;
use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::jira::models::WebhookEvent;
use crate::jira::registration::{register_issue, Registration};
use crate::state::AppState;

pub const ISSUE_UPDATED: &str = "jira:issue_updated";
pub const SECRET_HEADER: &str = "x-hub-signature";

#[derive(Debug, Deserialize)]
pub struct WebhookQuery {
    pub token: Option<String>,
}

/// POST /webhook/jira
///
/// Benign non-matches answer 200 so Jira does not redeliver them.
pub async fn handle_jira_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<WebhookQuery>, QueryRejection>,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let Query(query) = query?;
    let jira = &state.config.jira;

    if let Some(secret) = jira.webhook_secret.as_deref() {
        let supplied = headers
            .get(SECRET_HEADER)
            .and_then(|v| v.to_str().ok())
            .or(query.token.as_deref());
        if !token_matches(supplied, secret) {
            warn!("Jira webhook rejected: missing or invalid token");
            return Err(AppError::Unauthorized);
        }
    }

    let event: WebhookEvent =
        serde_json::from_slice(&body).context("Malformed Jira webhook payload")?;

    let event_type = event.webhook_event.as_deref().unwrap_or_default();
    if event_type != ISSUE_UPDATED {
        debug!("Jira webhook ignored: event '{event_type}'");
        return Ok(ignored(json!({ "reason": format!("event '{event_type}' is not handled") })));
    }

    let Some(change) = event.status_change() else {
        return Ok(ignored(json!({ "reason": "no status change" })));
    };

    let observed = change.to_status.as_deref().unwrap_or_default();
    if observed != jira.webhook_status {
        debug!(
            "Jira webhook ignored: status '{observed}' is not '{}'",
            jira.webhook_status
        );
        return Ok(ignored(json!({
            "reason": "status does not match target",
            "status": observed,
            "expected": jira.webhook_status,
        })));
    }

    let issue = event
        .issue
        .as_ref()
        .context("Jira webhook payload has no issue")?;
    let base_url = jira
        .base_url
        .as_deref()
        .context("JIRA_BASE_URL is not configured")?;

    debug!(
        "Jira issue {} moved from '{}' to '{observed}'",
        issue.key,
        change.from_status.as_deref().unwrap_or("?")
    );

    let today = Utc::now().date_naive();
    match register_issue(state.store.as_ref(), base_url, issue, today).await? {
        Registration::Created(row) => Ok((
            StatusCode::CREATED,
            Json(json!({
                "created": true,
                "key": issue.key,
                "name": row.name,
            })),
        )),
        Registration::AlreadyRegistered(existing) => Ok(ignored(json!({
            "reason": "already registered",
            "key": issue.key,
            "deploy_id": existing.id,
        }))),
    }
}

/// Compares the supplied token in constant time for equal-length inputs.
fn token_matches(supplied: Option<&str>, secret: &str) -> bool {
    supplied.is_some_and(|token| bool::from(token.as_bytes().ct_eq(secret.as_bytes())))
}

fn ignored(mut detail: Value) -> (StatusCode, Json<Value>) {
    detail["ignored"] = Value::Bool(true);
    (StatusCode::OK, Json(detail))
}
