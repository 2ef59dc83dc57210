use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::deploys::store::DeployStore;
use crate::models::deploy::{DeployRow, NewDeploy, Period, DEFAULT_ENV};

/// In-memory `DeployStore` for handler and ingestion tests.
#[derive(Default)]
pub struct MemoryDeployStore {
    rows: Mutex<Vec<DeployRow>>,
}

impl MemoryDeployStore {
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn rows(&self) -> Vec<DeployRow> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeployStore for MemoryDeployStore {
    async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        Ok(())
    }

    async fn create(&self, deploy: NewDeploy) -> Result<DeployRow, sqlx::Error> {
        let mut rows = self.rows.lock().unwrap();
        let id = rows.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        let row = DeployRow {
            id,
            name: deploy.name,
            date: deploy.date,
            env: deploy.env.unwrap_or_else(|| DEFAULT_ENV.to_string()),
            owner: deploy.owner,
            notes: deploy.notes,
            jira_key: deploy.jira_key,
            jira_url: deploy.jira_url,
            created_at: Utc::now(),
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn list_by_period(&self, period: Option<Period>) -> Result<Vec<DeployRow>, sqlx::Error> {
        let mut rows: Vec<DeployRow> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| match period {
                None => true,
                Some(p) => p
                    .date_range()
                    .is_some_and(|(start, end)| r.date >= start && r.date < end),
            })
            .cloned()
            .collect();
        rows.sort_by_key(|r| (r.date, r.id));
        Ok(rows)
    }

    async fn delete_by_id(&self, id: i32) -> Result<(), sqlx::Error> {
        self.rows.lock().unwrap().retain(|r| r.id != id);
        Ok(())
    }

    async fn find_by_jira_key(&self, key: &str) -> Result<Option<DeployRow>, sqlx::Error> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.jira_key.as_deref() == Some(key))
            .cloned())
    }
}
