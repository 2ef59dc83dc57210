use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const DEFAULT_ENV: &str = "prod";

/// A stored deploy. Rows are never updated after insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct DeployRow {
    pub id: i32,
    pub name: String,
    pub date: NaiveDate,
    pub env: String,
    pub owner: Option<String>,
    pub notes: Option<String>,
    pub jira_key: Option<String>,
    pub jira_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for `DeployStore::create`. `env` falls back to `"prod"` when `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDeploy {
    pub name: String,
    pub date: NaiveDate,
    pub env: Option<String>,
    pub owner: Option<String>,
    pub notes: Option<String>,
    pub jira_key: Option<String>,
    pub jira_url: Option<String>,
}

/// A calendar month used to filter listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// Half-open `[first day, first day of next month)` range, or `None` when
    /// the month is out of range.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let start = NaiveDate::from_ymd_opt(self.year, self.month, 1)?;
        let end = if self.month == 12 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)?
        };
        Some((start, end))
    }
}
