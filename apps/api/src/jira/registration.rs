//! The dedup-then-insert contract shared by the poller and the webhook.
//!
//! The existence check and the insert are two separate statements. Two
//! concurrent deliveries for the same key can both pass the check and insert
//! twice; the expected call volume makes this an accepted limitation.

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::deploys::store::DeployStore;
use crate::jira::models::JiraIssue;
use crate::models::deploy::{DeployRow, NewDeploy, DEFAULT_ENV};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    Created(DeployRow),
    AlreadyRegistered(DeployRow),
}

/// Browsable link to an issue.
pub fn browse_url(base_url: &str, key: &str) -> String {
    format!("{}/browse/{}", base_url.trim_end_matches('/'), key)
}

/// Registers `issue` as a production deploy dated `today`, unless a deploy
/// with the same Jira key already exists.
pub async fn register_issue(
    store: &dyn DeployStore,
    base_url: &str,
    issue: &JiraIssue,
    today: NaiveDate,
) -> Result<Registration, sqlx::Error> {
    if let Some(existing) = store.find_by_jira_key(&issue.key).await? {
        debug!("Jira issue {} already registered as deploy {}", issue.key, existing.id);
        return Ok(Registration::AlreadyRegistered(existing));
    }

    let row = store
        .create(NewDeploy {
            name: issue.deploy_name(),
            date: today,
            env: Some(DEFAULT_ENV.to_string()),
            owner: issue.assignee_name(),
            notes: None,
            jira_key: Some(issue.key.clone()),
            jira_url: Some(browse_url(base_url, &issue.key)),
        })
        .await?;

    info!("Deploy registered from Jira: [{}] {}", issue.key, row.name);
    Ok(Registration::Created(row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deploys::memory::MemoryDeployStore;
    use serde_json::json;

    fn issue(key: &str, summary: &str, assignee: Option<&str>) -> JiraIssue {
        serde_json::from_value(json!({
            "key": key,
            "fields": {
                "summary": summary,
                "assignee": assignee.map(|name| json!({ "displayName": name })),
            }
        }))
        .unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    #[test]
    fn test_browse_url_trims_trailing_slash() {
        assert_eq!(
            browse_url("https://acme.atlassian.net/", "OPS-1"),
            "https://acme.atlassian.net/browse/OPS-1"
        );
    }

    #[tokio::test]
    async fn test_creates_jira_sourced_row() {
        let store = MemoryDeployStore::default();
        let outcome = register_issue(
            &store,
            "https://acme.atlassian.net",
            &issue("OPS-7", "Ship search v2", Some("Priya N")),
            today(),
        )
        .await
        .unwrap();

        let Registration::Created(row) = outcome else {
            panic!("expected a new deploy");
        };
        assert_eq!(row.name, "Ship search v2");
        assert_eq!(row.date, today());
        assert_eq!(row.env, "prod");
        assert_eq!(row.owner.as_deref(), Some("Priya N"));
        assert_eq!(row.notes, None);
        assert_eq!(row.jira_key.as_deref(), Some("OPS-7"));
        assert_eq!(
            row.jira_url.as_deref(),
            Some("https://acme.atlassian.net/browse/OPS-7")
        );
    }

    #[tokio::test]
    async fn test_same_key_registers_once() {
        let store = MemoryDeployStore::default();
        let first = issue("OPS-8", "Ship billing", None);
        let renamed = issue("OPS-8", "Ship billing (renamed)", None);

        register_issue(&store, "https://acme.atlassian.net", &first, today())
            .await
            .unwrap();
        let second = register_issue(&store, "https://acme.atlassian.net", &renamed, today())
            .await
            .unwrap();

        assert!(matches!(second, Registration::AlreadyRegistered(ref row) if row.name == "Ship billing"));
        assert_eq!(store.len(), 1);
    }
}
