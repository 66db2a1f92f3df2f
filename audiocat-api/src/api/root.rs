//! Root greeting

/// GET /
pub async fn index() -> &'static str {
    "Hello world!"
}
