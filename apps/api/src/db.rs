use std::str::FromStr;

use anyhow::{Context, Result};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::PgPool;
use tracing::info;

/// Idempotent DDL for the single `deploys` table.
pub const DEPLOYS_SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS deploys (
        id         SERIAL PRIMARY KEY,
        name       TEXT NOT NULL,
        date       DATE NOT NULL,
        env        TEXT NOT NULL DEFAULT 'prod',
        owner      TEXT,
        notes      TEXT,
        jira_key   TEXT,
        jira_url   TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

/// Creates and returns a PostgreSQL connection pool.
///
/// With `require_tls` the connection is encrypted but the server certificate
/// is not verified; otherwise TLS is disabled.
pub async fn create_pool(database_url: &str, require_tls: bool) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let ssl_mode = if require_tls {
        PgSslMode::Require
    } else {
        PgSslMode::Disable
    };
    let options = PgConnectOptions::from_str(database_url)
        .context("DATABASE_URL is not a valid PostgreSQL connection string")?
        .ssl_mode(ssl_mode);

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await
        .context("Failed to connect to PostgreSQL")?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates the `deploys` table if it does not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(DEPLOYS_SCHEMA).execute(pool).await?;
    info!("Database schema ready");
    Ok(())
}
