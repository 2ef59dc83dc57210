use anyhow::{Context, Result};

pub const DEFAULT_POLL_STATUS: &str = "Done";
pub const DEFAULT_WEBHOOK_STATUS: &str = "In Production";

/// Application configuration loaded from environment variables.
/// Fails at startup if `DATABASE_URL` is missing or a value cannot be parsed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub app_env: String,
    pub port: u16,
    pub rust_log: String,
    pub jira: JiraConfig,
}

/// Jira integration settings. Every field is optional: the integration is
/// switched off piecewise when its settings are absent.
#[derive(Debug, Clone, Default)]
pub struct JiraConfig {
    pub base_url: Option<String>,
    pub email: Option<String>,
    pub api_token: Option<String>,
    pub project_key: Option<String>,
    /// Status the poller looks for (`JIRA_PRODUCTION_COLUMN`).
    pub poll_status: String,
    /// Status the webhook looks for (`JIRA_WEBHOOK_STATUS`).
    pub webhook_status: String,
    pub webhook_secret: Option<String>,
}

/// The full set of values needed to query Jira's search API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JiraCredentials {
    pub base_url: String,
    pub email: String,
    pub api_token: String,
    pub project_key: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            app_env: optional_env("APP_ENV").unwrap_or_else(|| "development".to_string()),
            port: optional_env("PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            jira: JiraConfig::from_env(),
        })
    }

    /// Production deployments talk to the database over TLS.
    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }
}

impl JiraConfig {
    fn from_env() -> Self {
        JiraConfig {
            base_url: optional_env("JIRA_BASE_URL").map(|url| url.trim_end_matches('/').to_string()),
            email: optional_env("JIRA_EMAIL"),
            api_token: optional_env("JIRA_API_TOKEN"),
            project_key: optional_env("JIRA_PROJECT_KEY"),
            poll_status: optional_env("JIRA_PRODUCTION_COLUMN")
                .unwrap_or_else(|| DEFAULT_POLL_STATUS.to_string()),
            webhook_status: optional_env("JIRA_WEBHOOK_STATUS")
                .unwrap_or_else(|| DEFAULT_WEBHOOK_STATUS.to_string()),
            webhook_secret: optional_env("JIRA_WEBHOOK_SECRET"),
        }
    }

    /// Returns the polling credentials, or `None` if any of them is unset.
    pub fn credentials(&self) -> Option<JiraCredentials> {
        Some(JiraCredentials {
            base_url: self.base_url.clone()?,
            email: self.email.clone()?,
            api_token: self.api_token.clone()?,
            project_key: self.project_key.clone()?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_url: String::new(),
            app_env: "development".to_string(),
            port: 3000,
            rust_log: "info".to_string(),
            jira: JiraConfig {
                poll_status: DEFAULT_POLL_STATUS.to_string(),
                webhook_status: DEFAULT_WEBHOOK_STATUS.to_string(),
                ..JiraConfig::default()
            },
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    optional_env(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Reads an environment variable, treating an empty value as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_jira() -> JiraConfig {
        JiraConfig {
            base_url: Some("https://acme.atlassian.net".to_string()),
            email: Some("ops@acme.io".to_string()),
            api_token: Some("token".to_string()),
            project_key: Some("OPS".to_string()),
            ..Config::default().jira
        }
    }

    #[test]
    fn test_credentials_present_when_all_set() {
        let creds = full_jira().credentials().unwrap();
        assert_eq!(creds.project_key, "OPS");
        assert_eq!(creds.base_url, "https://acme.atlassian.net");
    }

    #[test]
    fn test_credentials_absent_when_any_missing() {
        let mut jira = full_jira();
        jira.api_token = None;
        assert!(jira.credentials().is_none());
    }

    #[test]
    fn test_default_statuses_differ_per_path() {
        let jira = Config::default().jira;
        assert_eq!(jira.poll_status, "Done");
        assert_eq!(jira.webhook_status, "In Production");
    }

    #[test]
    fn test_production_flag() {
        let mut config = Config::default();
        assert!(!config.is_production());
        config.app_env = "Production".to_string();
        assert!(config.is_production());
    }
}
