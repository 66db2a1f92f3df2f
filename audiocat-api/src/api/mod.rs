//! HTTP API handlers for audiocat-api

pub mod buildinfo;
pub mod download;
pub mod health;
pub mod info;
pub mod list;
pub mod root;
pub mod upload;

pub use buildinfo::get_build_info;
pub use download::download_file;
pub use health::health_routes;
pub use info::get_file_info;
pub use list::{list_files, list_files_filtered};
pub use root::index;
pub use upload::upload_file;

use crate::error::{ApiError, ApiResult};

/// Value of a `key=value` path segment, as in `/info/name=song.wav`
pub(crate) fn segment_value<'a>(segment: &'a str, key: &str) -> ApiResult<&'a str> {
    segment
        .strip_prefix(key)
        .and_then(|rest| rest.strip_prefix('='))
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::NoRoute(format!("expected '{}=<value>', got '{}'", key, segment)))
}
