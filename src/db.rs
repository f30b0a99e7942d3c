//! SQLite connection and schema.
//!
//! The server shares one [`SqlitePool`] across handlers. The schema is a
//! single `movies` table; [`migrate`] is idempotent and runs on `init` and
//! on server startup.

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

use crate::config::DbConfig;

pub async fn connect(db: &DbConfig) -> Result<SqlitePool> {
    if let Some(parent) = db.path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db.path.display()))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Create the `movies` table if it does not exist yet.
///
/// `ranking` is REAL: creation stores the upstream vote average there, and
/// the listing rank is computed on read rather than persisted.
pub async fn migrate(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS movies (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL UNIQUE,
            year INTEGER NOT NULL,
            description TEXT NOT NULL,
            rating REAL,
            ranking REAL,
            review TEXT,
            img_url TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_movies_rating ON movies(rating)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Connect and make sure the schema exists.
pub async fn open(db: &DbConfig) -> Result<SqlitePool> {
    let pool = connect(db).await?;
    migrate(&pool).await?;
    Ok(pool)
}
