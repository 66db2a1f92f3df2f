//! audiocat-api library
//!
//! HTTP service that stores uploaded audio files, catalogs their duration and
//! size, and serves listing, lookup and download of the catalog.

use audiocat_common::config::{DuplicatePolicy, DEFAULT_MAX_UPLOAD_BYTES};
use axum::extract::DefaultBodyLimit;
use axum::Router;
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod error;
pub mod services;

use services::{MetadataExtractor, UploadStorage};

/// Application state shared across HTTP handlers
///
/// Built once at startup; the pool is closed again at shutdown.
#[derive(Clone)]
pub struct AppState {
    /// Catalog database connection pool
    pub db: SqlitePool,
    /// Directory holding the uploaded files
    pub storage: Arc<UploadStorage>,
    pub extractor: MetadataExtractor,
    pub duplicate_policy: DuplicatePolicy,
    /// Upload request body limit in bytes
    pub max_upload_bytes: usize,
    /// Serializes the record write + file rename step of concurrent uploads
    pub upload_lock: Arc<Mutex<()>>,
}

impl AppState {
    /// Create new application state with the default upload limit
    pub fn new(db: SqlitePool, storage_dir: impl Into<PathBuf>, duplicate_policy: DuplicatePolicy) -> Self {
        Self {
            db,
            storage: Arc::new(UploadStorage::new(storage_dir)),
            extractor: MetadataExtractor::new(),
            duplicate_policy,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            upload_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let upload = Router::new()
        .route("/upload", post(api::upload_file).put(api::upload_file))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes));

    let catalog = Router::new()
        .route("/download/:name", get(api::download_file))
        .route("/list", get(api::list_files))
        .route("/list/:maxduration", get(api::list_files_filtered))
        .route("/info/:name", get(api::get_file_info));

    let public = Router::new()
        .route("/", get(api::index))
        .route("/buildinfo", get(api::get_build_info))
        .merge(api::health_routes());

    Router::new()
        .merge(upload)
        .merge(catalog)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
