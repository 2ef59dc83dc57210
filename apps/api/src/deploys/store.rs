//! Deploy Store — the only module that touches the `deploys` table.
//!
//! `AppState` and the Jira poller hold an `Arc<dyn DeployStore>`; production
//! wires in `PgDeployStore`, tests use the in-memory double.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::db::ensure_schema;
use crate::models::deploy::{DeployRow, NewDeploy, Period, DEFAULT_ENV};

#[async_trait]
pub trait DeployStore: Send + Sync {
    /// Creates the backing table if needed. Safe to call on every startup.
    async fn ensure_schema(&self) -> Result<(), sqlx::Error>;

    /// Inserts a deploy and returns the stored row with its id and timestamp.
    async fn create(&self, deploy: NewDeploy) -> Result<DeployRow, sqlx::Error>;

    /// All deploys, or those dated within `period`, ascending by date.
    async fn list_by_period(&self, period: Option<Period>) -> Result<Vec<DeployRow>, sqlx::Error>;

    /// Deletes the deploy if it exists. Deleting a missing id is not an error.
    async fn delete_by_id(&self, id: i32) -> Result<(), sqlx::Error>;

    async fn find_by_jira_key(&self, key: &str) -> Result<Option<DeployRow>, sqlx::Error>;
}

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgDeployStore {
    pool: PgPool,
}

impl PgDeployStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeployStore for PgDeployStore {
    async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        ensure_schema(&self.pool).await
    }

    async fn create(&self, deploy: NewDeploy) -> Result<DeployRow, sqlx::Error> {
        sqlx::query_as::<_, DeployRow>(
            r#"
            INSERT INTO deploys (name, date, env, owner, notes, jira_key, jira_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&deploy.name)
        .bind(deploy.date)
        .bind(deploy.env.as_deref().unwrap_or(DEFAULT_ENV))
        .bind(&deploy.owner)
        .bind(&deploy.notes)
        .bind(&deploy.jira_key)
        .bind(&deploy.jira_url)
        .fetch_one(&self.pool)
        .await
    }

    async fn list_by_period(&self, period: Option<Period>) -> Result<Vec<DeployRow>, sqlx::Error> {
        let Some(period) = period else {
            return sqlx::query_as::<_, DeployRow>("SELECT * FROM deploys ORDER BY date ASC, id ASC")
                .fetch_all(&self.pool)
                .await;
        };

        // No calendar month matches an out-of-range month number.
        let Some((start, end)) = period.date_range() else {
            return Ok(Vec::new());
        };

        sqlx::query_as::<_, DeployRow>(
            "SELECT * FROM deploys WHERE date >= $1 AND date < $2 ORDER BY date ASC, id ASC",
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
    }

    async fn delete_by_id(&self, id: i32) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM deploys WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_by_jira_key(&self, key: &str) -> Result<Option<DeployRow>, sqlx::Error> {
        sqlx::query_as::<_, DeployRow>("SELECT * FROM deploys WHERE jira_key = $1 LIMIT 1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
    }
}
