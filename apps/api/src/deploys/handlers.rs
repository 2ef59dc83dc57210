use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::errors::AppError;
use crate::models::deploy::{DeployRow, NewDeploy, Period};
use crate::state::AppState;

/// Raw listing filter. Kept as strings so `?year=&month=` reads as "no filter".
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    pub year: Option<String>,
    pub month: Option<String>,
}

impl PeriodQuery {
    /// Filtering applies only when both year and month are given.
    fn period(&self) -> Result<Option<Period>, AppError> {
        let (Some(year), Some(month)) = (non_blank(&self.year), non_blank(&self.month)) else {
            return Ok(None);
        };
        let year = year
            .parse::<i32>()
            .map_err(|_| AppError::Validation(format!("year '{year}' must be a number")))?;
        let month = month
            .parse::<u32>()
            .map_err(|_| AppError::Validation(format!("month '{month}' must be a number")))?;
        Ok(Some(Period::new(year, month)))
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Body of a manual deploy entry. Everything is optional at the wire level so
/// missing fields produce a 400 from validation rather than a rejection.
#[derive(Debug, Default, Deserialize)]
pub struct CreateDeployRequest {
    pub name: Option<String>,
    pub date: Option<String>,
    pub env: Option<String>,
    pub owner: Option<String>,
    pub notes: Option<String>,
}

impl CreateDeployRequest {
    pub fn into_new_deploy(self) -> Result<NewDeploy, AppError> {
        let (Some(name), Some(date)) = (non_empty(self.name), non_empty(self.date)) else {
            return Err(AppError::Validation("name and date are required".to_string()));
        };
        let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
            .map_err(|_| AppError::Validation(format!("date '{date}' must be YYYY-MM-DD")))?;

        Ok(NewDeploy {
            name,
            date,
            env: non_empty(self.env),
            owner: non_empty(self.owner),
            notes: non_empty(self.notes),
            jira_key: None,
            jira_url: None,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// GET /api/deploys?year=2026&month=3
pub async fn handle_list_deploys(
    State(state): State<AppState>,
    query: Result<Query<PeriodQuery>, QueryRejection>,
) -> Result<Json<Vec<DeployRow>>, AppError> {
    let Query(params) = query?;
    let deploys = state.store.list_by_period(params.period()?).await?;
    Ok(Json(deploys))
}

/// POST /api/deploys
pub async fn handle_create_deploy(
    State(state): State<AppState>,
    body: Result<Json<CreateDeployRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<DeployRow>), AppError> {
    let Json(req) = body?;
    let deploy = req.into_new_deploy()?;
    let row = state.store.create(deploy).await?;
    info!("Deploy {} created manually: {}", row.id, row.name);
    Ok((StatusCode::CREATED, Json(row)))
}

/// DELETE /api/deploys/:id
pub async fn handle_delete_deploy(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<Value>, AppError> {
    let Path(id) = id?;
    state.store.delete_by_id(id).await?;
    Ok(Json(json!({ "ok": true })))
}
