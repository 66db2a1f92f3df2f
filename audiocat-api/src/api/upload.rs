//! Audio file upload
//!
//! Flow: sanitize the filename, stream the multipart field into a staging
//! file, extract metadata from it, then under the upload lock write the
//! catalog record and install the staging file under its final name inside
//! one transaction. The install is reverted unless the commit succeeds, so a
//! failed upload leaves the previous file and record (or neither) in place.

use axum::extract::{Multipart, State};
use audiocat_common::config::DuplicatePolicy;
use audiocat_common::db::AudioFileRecord;
use tokio::io::AsyncWriteExt;
use tracing::{error, info, warn};

use crate::db::catalog;
use crate::error::{ApiError, ApiResult};
use crate::services::{secure_filename, StagedUpload};
use crate::AppState;

/// Multipart field carrying the upload
const FILE_FIELD: &str = "file";

/// POST /upload, PUT /upload
///
/// Returns a plain-text confirmation naming the stored file.
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<String> {
    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let raw_name = field.file_name().unwrap_or_default().to_string();
        let name = secure_filename(&raw_name).ok_or_else(|| {
            warn!(raw_name = %raw_name, "Rejected upload filename");
            ApiError::InvalidFilename(raw_name.clone())
        })?;

        if state.duplicate_policy == DuplicatePolicy::Reject
            && catalog::load_record_by_name(&state.db, &name).await?.is_some()
        {
            return Err(ApiError::Duplicate(name));
        }

        let (staged, mut file) = state
            .storage
            .create_staged(&name)
            .await
            .map_err(ApiError::StorageWrite)?;

        let mut received: u64 = 0;
        while let Some(chunk) = field.chunk().await? {
            file.write_all(&chunk).await.map_err(ApiError::StorageWrite)?;
            received += chunk.len() as u64;
        }
        file.flush().await.map_err(ApiError::StorageWrite)?;
        file.sync_all().await.map_err(ApiError::StorageWrite)?;
        drop(file);

        info!(file = %name, size = received, "Upload received");

        let metadata = state
            .extractor
            .extract_blocking(staged.path().to_path_buf())
            .await
            .map_err(|e| {
                warn!(file = %name, error = %e, "Metadata extraction failed");
                ApiError::from(e)
            })?;

        let record = AudioFileRecord::new(name, metadata.duration_seconds, metadata.file_size_bytes);
        commit_upload(&state, staged, &record).await?;

        info!(
            file = %record.name,
            duration_s = record.duration,
            size = record.size,
            format = %metadata.format,
            "Upload catalogued"
        );

        return Ok(format!("{} successfully uploaded!", record.name));
    }

    Err(ApiError::BadRequest(format!(
        "Missing multipart field '{}'",
        FILE_FIELD
    )))
}

/// Write the record and move the staged file into place as one unit
async fn commit_upload(
    state: &AppState,
    staged: StagedUpload,
    record: &AudioFileRecord,
) -> ApiResult<()> {
    let _guard = state.upload_lock.lock().await;

    let mut tx = state.db.begin().await?;
    match state.duplicate_policy {
        DuplicatePolicy::Overwrite => catalog::upsert_record(&mut *tx, record).await?,
        DuplicatePolicy::Reject => catalog::insert_record(&mut *tx, record).await?,
    }

    let installed = state
        .storage
        .install(staged, &record.name)
        .await
        .map_err(ApiError::StorageWrite)?;

    if let Err(e) = tx.commit().await {
        error!(file = %record.name, error = %e, "Catalog commit failed, reverting stored file");
        if let Err(revert) = installed.revert() {
            error!(file = %record.name, error = %revert, "Failed to revert stored file");
        }
        return Err(ApiError::Database(e));
    }

    installed.keep();
    Ok(())
}
