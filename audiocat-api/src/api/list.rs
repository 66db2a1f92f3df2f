//! Catalog listing with optional duration filter

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::collections::BTreeMap;

use super::segment_value;
use crate::db::catalog;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// `name -> duration` for every listed file
pub type DurationMap = BTreeMap<String, f64>;

/// Query parameters for GET /list
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub maxduration: Option<String>,
}

/// GET /list, GET /list?maxduration=<x>
pub async fn list_files(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<DurationMap>> {
    let max_duration = match query.maxduration.as_deref() {
        Some(raw) => parse_max_duration(raw)?,
        None => f64::INFINITY,
    };
    list_below(&state, max_duration).await
}

/// GET /list/maxduration=<x>
pub async fn list_files_filtered(
    State(state): State<AppState>,
    Path(segment): Path<String>,
) -> ApiResult<Json<DurationMap>> {
    let max_duration = parse_max_duration(segment_value(&segment, "maxduration")?)?;
    list_below(&state, max_duration).await
}

async fn list_below(state: &AppState, max_duration: f64) -> ApiResult<Json<DurationMap>> {
    let rows = catalog::list_durations(&state.db, max_duration).await?;
    Ok(Json(rows.into_iter().collect()))
}

/// Parse a duration bound in seconds. `inf` is accepted, NaN is not.
fn parse_max_duration(raw: &str) -> ApiResult<f64> {
    match raw.trim().parse::<f64>() {
        Ok(value) if !value.is_nan() => Ok(value),
        _ => Err(ApiError::BadRequest(format!("maxduration must be a number, got '{}'", raw))),
    }
}
