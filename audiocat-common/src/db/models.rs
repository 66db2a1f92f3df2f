//! Database models

use serde::{Deserialize, Serialize};

/// One uploaded audio file as stored in the `audio_files` table.
///
/// `name` is the sanitized upload filename and is unique across the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AudioFileRecord {
    pub name: String,
    /// Seconds, rounded to millisecond precision
    pub duration: f64,
    /// Bytes
    pub size: i64,
}

impl AudioFileRecord {
    /// Build a record, rounding `duration_seconds` to three decimal places
    pub fn new(name: impl Into<String>, duration_seconds: f64, size: u64) -> Self {
        Self {
            name: name.into(),
            duration: round_millis(duration_seconds),
            size: i64::try_from(size).unwrap_or(i64::MAX),
        }
    }
}

/// Round seconds to three decimal places
pub fn round_millis(seconds: f64) -> f64 {
    (seconds * 1000.0).round() / 1000.0
}
