//! # audiocat common library
//!
//! Shared code for the audiocat service crates:
//! - Error type
//! - Bootstrap configuration and root folder resolution
//! - Catalog database initialization and models

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
