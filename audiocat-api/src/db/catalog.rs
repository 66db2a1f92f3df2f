//! Catalog store: one `audio_files` row per uploaded file, keyed by name
//!
//! Write functions accept any SQLite executor so the upload path can run them
//! inside the transaction that also covers the file rename.

use audiocat_common::db::AudioFileRecord;
use audiocat_common::{Error, Result};
use sqlx::{Executor, Sqlite, SqlitePool};

/// Insert a new record; an existing name yields `Error::Duplicate`
pub async fn insert_record<'e, E>(executor: E, record: &AudioFileRecord) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("INSERT INTO audio_files (name, duration, size) VALUES (?, ?, ?)")
        .bind(&record.name)
        .bind(record.duration)
        .bind(record.size)
        .execute(executor)
        .await;

    match result {
        Ok(_) => Ok(()),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            Err(Error::Duplicate(record.name.clone()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Insert a record, or replace duration and size of an existing one
pub async fn upsert_record<'e, E>(executor: E, record: &AudioFileRecord) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO audio_files (name, duration, size)
        VALUES (?, ?, ?)
        ON CONFLICT(name) DO UPDATE SET
            duration = excluded.duration,
            size = excluded.size,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(&record.name)
    .bind(record.duration)
    .bind(record.size)
    .execute(executor)
    .await?;

    Ok(())
}

/// Exact-match lookup by name
pub async fn load_record_by_name(pool: &SqlitePool, name: &str) -> Result<Option<AudioFileRecord>> {
    let record = sqlx::query_as::<_, AudioFileRecord>(
        "SELECT name, duration, size FROM audio_files WHERE name = ?",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

/// `(name, duration)` for every record with `duration < max_duration`.
///
/// `f64::INFINITY` disables the filter. Row order is unspecified.
pub async fn list_durations(pool: &SqlitePool, max_duration: f64) -> Result<Vec<(String, f64)>> {
    let rows = if max_duration == f64::INFINITY {
        sqlx::query_as::<_, (String, f64)>("SELECT name, duration FROM audio_files")
            .fetch_all(pool)
            .await?
    } else {
        sqlx::query_as::<_, (String, f64)>("SELECT name, duration FROM audio_files WHERE duration < ?")
            .bind(max_duration)
            .fetch_all(pool)
            .await?
    };

    Ok(rows)
}
