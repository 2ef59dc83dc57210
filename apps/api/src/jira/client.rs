use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::ACCEPT, Client};
use thiserror::Error;
use tracing::debug;

use crate::config::JiraCredentials;
use crate::jira::models::{JiraIssue, SearchResponse};

const SEARCH_PATH: &str = "/rest/api/3/search";
const SEARCH_FIELDS: &str = "summary,assignee,statuscategorychangedate";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum JiraError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Jira API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

/// Issue search seam. The poller depends on this trait so a cycle can be
/// exercised without a Jira site.
#[async_trait]
pub trait IssueSearch: Send + Sync {
    async fn search(&self, creds: &JiraCredentials, jql: &str) -> Result<Vec<JiraIssue>, JiraError>;
}

/// Authenticated client for Jira Cloud's REST search endpoint.
#[derive(Clone)]
pub struct JiraClient {
    client: Client,
}

impl JiraClient {
    pub fn new() -> Result<Self, JiraError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
        })
    }
}

#[async_trait]
impl IssueSearch for JiraClient {
    async fn search(&self, creds: &JiraCredentials, jql: &str) -> Result<Vec<JiraIssue>, JiraError> {
        let url = format!("{}{}", creds.base_url, SEARCH_PATH);
        debug!("Jira search: {jql}");

        let response = self
            .client
            .get(&url)
            .basic_auth(&creds.email, Some(&creds.api_token))
            .header(ACCEPT, "application/json")
            .query(&[("jql", jql), ("fields", SEARCH_FIELDS)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(JiraError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: SearchResponse = response.json().await?;
        Ok(body.issues)
    }
}
