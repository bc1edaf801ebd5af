//! Settings key-value access

use sqlx::SqlitePool;
use std::str::FromStr;

use crate::error::{Error, Result};

const SPLASH_SHOWN: &str = "splash_shown";

/// Whether the first-run splash has been shown (false when never set)
pub async fn get_splash_shown(db: &SqlitePool) -> Result<bool> {
    Ok(get_setting::<bool>(db, SPLASH_SHOWN).await?.unwrap_or(false))
}

pub async fn set_splash_shown(db: &SqlitePool, shown: bool) -> Result<()> {
    set_setting(db, SPLASH_SHOWN, shown).await
}

/// Read and parse a setting
///
/// Returns None if the key is absent, an error if the stored text does not
/// parse as `T`.
pub async fn get_setting<T: FromStr>(db: &SqlitePool, key: &str) -> Result<Option<T>> {
    let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(db)
        .await?;

    match value {
        Some(s) => s
            .parse::<T>()
            .map(Some)
            .map_err(|_| Error::Config(format!("Failed to parse setting '{}' value: {}", key, s))),
        None => Ok(None),
    }
}

/// Insert or overwrite a setting
pub async fn set_setting<T: ToString>(db: &SqlitePool, key: &str, value: T) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO settings (key, value)
        VALUES (?, ?)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(key)
    .bind(value.to_string())
    .execute(db)
    .await?;

    Ok(())
}
