//! Upload-side services: filename sanitization, file storage and metadata extraction

pub mod filename;
pub mod metadata_extractor;
pub mod storage;

pub use filename::{secure_filename, MAX_FILENAME_LEN};
pub use metadata_extractor::{AudioMetadata, MetadataError, MetadataExtractor};
pub use storage::{StagedUpload, StoredReplacement, UploadStorage};
