//! Shared helpers for audiocat-api integration tests

#![allow(dead_code)]

use audiocat_api::{build_router, AppState};
use audiocat_common::config::DuplicatePolicy;
use audiocat_common::db::init_database;
use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use serde_json::Value;
use sqlx::SqlitePool;
use std::io::Cursor;
use std::path::PathBuf;
use tempfile::TempDir;

pub const BOUNDARY: &str = "audiocat-test-boundary";

/// Router plus the resources behind it. `_dir` must outlive the test.
pub struct TestApp {
    pub _dir: TempDir,
    pub app: Router,
    pub pool: SqlitePool,
    pub storage_dir: PathBuf,
}

impl TestApp {
    /// Names of all files currently in the storage directory, sorted
    pub fn stored_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.storage_dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    pub async fn record_count(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM audio_files")
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }
}

pub async fn setup_app(policy: DuplicatePolicy) -> TestApp {
    setup_app_with_limit(policy, None).await
}

pub async fn setup_app_with_limit(policy: DuplicatePolicy, max_upload_bytes: Option<usize>) -> TestApp {
    let dir = TempDir::new().unwrap();
    let storage_dir = dir.path().join("uploads");
    std::fs::create_dir_all(&storage_dir).unwrap();

    let pool = init_database(&dir.path().join("audiocat.db"))
        .await
        .expect("Should initialize test database");

    let mut state = AppState::new(pool.clone(), storage_dir.clone(), policy);
    if let Some(limit) = max_upload_bytes {
        state = state.with_max_upload_bytes(limit);
    }

    TestApp {
        _dir: dir,
        app: build_router(state),
        pool,
        storage_dir,
    }
}

/// Mono 16-bit PCM WAV lasting `samples / sample_rate` seconds
pub fn wav_bytes(sample_rate: u32, samples: u32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for i in 0..samples {
            writer.write_sample(((i % 100) as i16 - 50) * 200).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

/// WAV of `seconds` length at 8 kHz
pub fn wav_seconds(seconds: u32) -> Vec<u8> {
    wav_bytes(8000, 8000 * seconds)
}

/// Multipart request with a single file part
pub fn upload_request(method: &str, field: &str, filename: &str, content: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method(method)
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_bytes(body: Body) -> Vec<u8> {
    axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body")
        .to_vec()
}

pub async fn body_text(body: Body) -> String {
    String::from_utf8(body_bytes(body).await).expect("Body should be UTF-8")
}

pub async fn extract_json(body: Body) -> Value {
    serde_json::from_slice(&body_bytes(body).await).expect("Should parse JSON")
}
