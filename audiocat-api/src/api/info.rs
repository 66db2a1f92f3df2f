//! Single-file metadata lookup

use axum::{
    extract::{Path, State},
    Json,
};
use audiocat_common::db::{round_millis, AudioFileRecord};

use super::segment_value;
use crate::db::catalog;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /info/name=<filename>
///
/// Returns `{name, duration, size}` for a catalogued file, or the plain-text
/// not-found response.
pub async fn get_file_info(
    State(state): State<AppState>,
    Path(segment): Path<String>,
) -> ApiResult<Json<AudioFileRecord>> {
    let name = segment_value(&segment, "name")?;

    let record = catalog::load_record_by_name(&state.db, name)
        .await?
        .ok_or_else(|| ApiError::NotFound(name.to_string()))?;

    Ok(Json(AudioFileRecord {
        duration: round_millis(record.duration),
        ..record
    }))
}
