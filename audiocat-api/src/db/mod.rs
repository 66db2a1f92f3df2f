//! Database access layer for audiocat-api

pub mod catalog;

pub use audiocat_common::db::{init_database, AudioFileRecord};
pub use catalog::{insert_record, list_durations, load_record_by_name, upsert_record};
