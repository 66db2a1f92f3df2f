//! Catalog database initialization and models

pub mod init;
pub mod models;

pub use init::*;
pub use models::*;
