//! Preference store
//!
//! Small SQLite database next to the player holding the splash flag and the
//! recent search list. Playback state itself is never persisted.

pub mod init;
pub mod search_history;
pub mod settings;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use tracing::info;

use crate::error::{Error, Result};

/// Open (creating if needed) the preference database and its tables
pub async fn connect(path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .journal_mode(SqliteJournalMode::Wal)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .connect_with(options)
        .await
        .map_err(|e| Error::Config(format!("Cannot open database {}: {}", path.display(), e)))?;

    init::create_tables(&pool).await?;
    info!("Preference database ready at {}", path.display());
    Ok(pool)
}

/// In-memory database with the schema applied
///
/// Single connection: every `sqlite::memory:` connection is its own database.
pub async fn connect_in_memory() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    init::create_tables(&pool).await?;
    Ok(pool)
}
