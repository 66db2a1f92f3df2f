//! Catalog database initialization tests

use audiocat_common::db::init_database;
use tempfile::TempDir;

#[tokio::test]
async fn test_init_creates_database_and_table() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("nested").join("audiocat.db");

    let pool = init_database(&db_path).await.expect("Should initialize database");
    assert!(db_path.exists());

    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();
    assert_eq!(tables, vec!["audio_files".to_string()]);

    pool.close().await;
}

#[tokio::test]
async fn test_init_is_idempotent_and_preserves_rows() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("audiocat.db");

    let pool = init_database(&db_path).await.unwrap();
    sqlx::query("INSERT INTO audio_files (name, duration, size) VALUES (?, ?, ?)")
        .bind("preamble.wav")
        .bind(12.5_f64)
        .bind(1024_i64)
        .execute(&pool)
        .await
        .unwrap();
    pool.close().await;

    // Second startup against the same file
    let pool = init_database(&db_path).await.expect("Re-init should succeed");
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audio_files")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
    pool.close().await;
}

#[tokio::test]
async fn test_schema_constraints() {
    let temp_dir = TempDir::new().unwrap();
    let pool = init_database(&temp_dir.path().join("audiocat.db")).await.unwrap();

    let insert = "INSERT INTO audio_files (name, duration, size) VALUES (?, ?, ?)";

    sqlx::query(insert).bind("a.wav").bind(1.0_f64).bind(10_i64).execute(&pool).await.unwrap();

    // name is unique
    let dup = sqlx::query(insert).bind("a.wav").bind(2.0_f64).bind(20_i64).execute(&pool).await;
    assert!(dup.is_err());

    // negative duration and size are rejected
    let neg_duration = sqlx::query(insert).bind("b.wav").bind(-1.0_f64).bind(10_i64).execute(&pool).await;
    assert!(neg_duration.is_err());
    let neg_size = sqlx::query(insert).bind("c.wav").bind(1.0_f64).bind(-10_i64).execute(&pool).await;
    assert!(neg_size.is_err());

    pool.close().await;
}
