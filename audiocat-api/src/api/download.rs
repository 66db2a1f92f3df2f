//! File download

use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use std::io;
use tokio_util::io::ReaderStream;
use tracing::{error, info};

use super::segment_value;
use crate::db::catalog;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /download/name=<filename>
///
/// Streams the stored bytes of a catalogued file. A catalog entry whose file
/// has gone missing from storage is reported as a server error.
pub async fn download_file(
    State(state): State<AppState>,
    Path(segment): Path<String>,
) -> ApiResult<Response> {
    let name = segment_value(&segment, "name")?;

    let record = catalog::load_record_by_name(&state.db, name)
        .await?
        .ok_or_else(|| ApiError::NotFound(name.to_string()))?;

    let path = state.storage.path_for(&record.name);
    let file = state.storage.open(&record.name).await.map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            error!(file = %record.name, path = %path.display(), "Catalogued file missing from storage");
        }
        ApiError::StorageRead(format!("{}: {}", record.name, e))
    })?;

    let length = file
        .metadata()
        .await
        .map_err(|e| ApiError::StorageRead(format!("{}: {}", record.name, e)))?
        .len();

    let content_type = infer::get_from_path(&path)
        .ok()
        .flatten()
        .map(|kind| kind.mime_type())
        .unwrap_or("application/octet-stream");

    info!(file = %record.name, size = length, "Serving download");

    let body = Body::from_stream(ReaderStream::new(file));
    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_LENGTH, length.to_string()),
        ],
        body,
    )
        .into_response())
}
