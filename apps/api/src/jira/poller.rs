//! Jira Poller — recurring search for issues that recently moved into the
//! production status, each registered as a deploy.
//!
//! Runs once at startup and then every `POLL_INTERVAL`. A failed cycle is
//! logged and left for the next tick to pick up.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::config::{JiraConfig, JiraCredentials};
use crate::deploys::store::DeployStore;
use crate::jira::client::{IssueSearch, JiraError};
use crate::jira::registration::{register_issue, Registration};

pub const POLL_INTERVAL: Duration = Duration::from_secs(2 * 60);
/// How far back a status transition may lie and still be picked up.
const TRANSITION_WINDOW: &str = "-10m";

#[derive(Debug, Error)]
enum PollError {
    #[error(transparent)]
    Jira(#[from] JiraError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Jira is not configured; nothing was queried.
    Skipped,
    Completed { found: usize, registered: usize },
    Failed,
}

/// JQL for issues in `status` that transitioned into it within the window.
pub fn build_jql(project: &str, status: &str) -> String {
    let project = escape_jql(project);
    let status = escape_jql(status);
    format!(
        r#"project = "{project}" AND status = "{status}" AND status changed to "{status}" after "{TRANSITION_WINDOW}""#
    )
}

fn escape_jql(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

pub struct JiraPoller {
    source: Arc<dyn IssueSearch>,
    store: Arc<dyn DeployStore>,
    jira: JiraConfig,
}

impl JiraPoller {
    pub fn new(source: Arc<dyn IssueSearch>, store: Arc<dyn DeployStore>, jira: JiraConfig) -> Self {
        Self { source, store, jira }
    }

    /// Runs one poll cycle. Never returns an error: failures are logged.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let Some(creds) = self.jira.credentials() else {
            warn!("Jira polling skipped: JIRA_BASE_URL, JIRA_EMAIL, JIRA_API_TOKEN and JIRA_PROJECT_KEY are required");
            return CycleOutcome::Skipped;
        };

        match self.poll(&creds).await {
            Ok((found, registered)) => {
                info!("Jira poll complete: {found} issue(s) found, {registered} deploy(s) registered");
                CycleOutcome::Completed { found, registered }
            }
            Err(e) => {
                error!("Jira polling error: {e}");
                CycleOutcome::Failed
            }
        }
    }

    async fn poll(&self, creds: &JiraCredentials) -> Result<(usize, usize), PollError> {
        let jql = build_jql(&creds.project_key, &self.jira.poll_status);
        let issues = self.source.search(creds, &jql).await?;

        let today = Utc::now().date_naive();
        let mut registered = 0;
        for issue in &issues {
            let outcome = register_issue(self.store.as_ref(), &creds.base_url, issue, today).await?;
            if matches!(outcome, Registration::Created(_)) {
                registered += 1;
            }
        }
        Ok((issues.len(), registered))
    }

    /// Spawns the recurring loop. The first tick fires immediately; the loop
    /// exits once `shutdown` changes or its sender is dropped.
    pub fn spawn(self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(POLL_INTERVAL);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!("Jira polling started (every {}s)", POLL_INTERVAL.as_secs());

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        self.run_cycle().await;
                    }
                    _ = shutdown.changed() => {
                        info!("Jira polling stopped");
                        break;
                    }
                }
            }
        })
    }
}
