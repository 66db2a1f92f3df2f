//! Audio metadata extraction service
//!
//! Extract duration and size from uploaded audio files using lofty. The
//! container is sniffed from file content first and from the extension
//! second, so a mislabelled upload is still recognised.

use lofty::file::{FileType, TaggedFileExt};
use lofty::prelude::*;
use lofty::probe::Probe;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Metadata extraction errors
#[derive(Debug, Error)]
pub enum MetadataError {
    /// lofty could not identify or parse the file
    #[error("{0}")]
    UnsupportedFormat(String),

    /// I/O error (file read)
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Blocking extraction task panicked or was cancelled
    #[error("Extraction task failed: {0}")]
    TaskFailed(String),
}

/// Extracted audio metadata
#[derive(Debug, Clone)]
pub struct AudioMetadata {
    /// Duration in seconds (unrounded)
    pub duration_seconds: f64,

    /// File size in bytes
    pub file_size_bytes: u64,

    /// Audio format (MP3, FLAC, etc.)
    pub format: String,
}

/// Metadata extractor service
#[derive(Debug, Default, Clone, Copy)]
pub struct MetadataExtractor;

impl MetadataExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract metadata from audio file
    pub fn extract(&self, file_path: &Path) -> Result<AudioMetadata, MetadataError> {
        let file_size_bytes = std::fs::metadata(file_path)?.len();

        let tagged_file = Probe::open(file_path)
            .map_err(|e| MetadataError::UnsupportedFormat(e.to_string()))?
            .guess_file_type()?
            .read()
            .map_err(|e| MetadataError::UnsupportedFormat(e.to_string()))?;

        let duration_seconds = tagged_file.properties().duration().as_secs_f64();

        let format = match tagged_file.file_type() {
            FileType::Mpeg => "MP3",
            FileType::Flac => "FLAC",
            FileType::Opus => "Opus",
            FileType::Vorbis => "OGG Vorbis",
            FileType::Aac => "AAC",
            FileType::Aiff => "AIFF",
            FileType::Wav => "WAV",
            FileType::WavPack => "WavPack",
            FileType::Mp4 => "MP4",
            _ => "Unknown",
        }
        .to_string();

        tracing::debug!(
            file = %file_path.display(),
            duration_s = duration_seconds,
            size = file_size_bytes,
            format = %format,
            "Extracted metadata"
        );

        Ok(AudioMetadata {
            duration_seconds,
            file_size_bytes,
            format,
        })
    }

    /// Run [`extract`](Self::extract) on the blocking thread pool
    pub async fn extract_blocking(&self, file_path: PathBuf) -> Result<AudioMetadata, MetadataError> {
        let extractor = *self;
        tokio::task::spawn_blocking(move || extractor.extract(&file_path))
            .await
            .map_err(|e| MetadataError::TaskFailed(e.to_string()))?
    }
}
