//! Recent searches
//!
//! At most [`MAX_ENTRIES`] distinct queries, newest first. Searching again
//! for a remembered query moves it to the front instead of duplicating it.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::Result;

pub const MAX_ENTRIES: i64 = 10;

/// Remember a query; blank input is ignored
///
/// Returns whether anything was stored.
pub async fn record(db: &SqlitePool, query: &str) -> Result<bool> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(false);
    }

    let mut tx = db.begin().await?;
    sqlx::query("DELETE FROM search_history WHERE query = ?")
        .bind(query)
        .execute(&mut *tx)
        .await?;
    sqlx::query("INSERT INTO search_history (query) VALUES (?)")
        .bind(query)
        .execute(&mut *tx)
        .await?;
    let trimmed = sqlx::query(
        r#"
        DELETE FROM search_history
        WHERE id NOT IN (SELECT id FROM search_history ORDER BY id DESC LIMIT ?)
        "#,
    )
    .bind(MAX_ENTRIES)
    .execute(&mut *tx)
    .await?
    .rows_affected();
    tx.commit().await?;

    debug!(query, trimmed, "Search recorded");
    Ok(true)
}

/// Remembered queries, newest first
pub async fn list(db: &SqlitePool) -> Result<Vec<String>> {
    let queries: Vec<String> = sqlx::query_scalar("SELECT query FROM search_history ORDER BY id DESC LIMIT ?")
        .bind(MAX_ENTRIES)
        .fetch_all(db)
        .await?;
    Ok(queries)
}

/// Forget every query
pub async fn clear(db: &SqlitePool) -> Result<u64> {
    let removed = sqlx::query("DELETE FROM search_history")
        .execute(db)
        .await?
        .rows_affected();
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;

    #[tokio::test]
    async fn test_newest_first_and_move_to_front() {
        let db = connect_in_memory().await.unwrap();
        record(&db, "lofi").await.unwrap();
        record(&db, "jazz").await.unwrap();
        record(&db, "  lofi  ").await.unwrap();

        assert_eq!(list(&db).await.unwrap(), vec!["lofi", "jazz"]);
    }

    #[tokio::test]
    async fn test_blank_queries_ignored() {
        let db = connect_in_memory().await.unwrap();
        assert!(!record(&db, "   ").await.unwrap());
        assert!(!record(&db, "").await.unwrap());
        assert!(list(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_capped_at_ten() {
        let db = connect_in_memory().await.unwrap();
        for i in 0..13 {
            record(&db, &format!("q{}", i)).await.unwrap();
        }

        let history = list(&db).await.unwrap();
        assert_eq!(history.len(), 10);
        assert_eq!(history.first().map(String::as_str), Some("q12"));
        assert_eq!(history.last().map(String::as_str), Some("q3"));
    }

    #[tokio::test]
    async fn test_match_is_case_sensitive_and_clear_empties() {
        let db = connect_in_memory().await.unwrap();
        record(&db, "Lofi").await.unwrap();
        record(&db, "lofi").await.unwrap();
        assert_eq!(list(&db).await.unwrap().len(), 2);

        assert_eq!(clear(&db).await.unwrap(), 2);
        assert!(list(&db).await.unwrap().is_empty());
    }
}
