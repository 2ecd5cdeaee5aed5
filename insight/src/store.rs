use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::InsightError;

/// A single news item as stored in the `articles` relation. The application
/// holds read-only copies per render pass; only the two boolean flags are
/// ever mutated, via the explicit update calls below.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub summary: String,
    pub url: String,
    /// ISO-8601 timestamp with offset or `Z` marker, kept as stored.
    pub created_at: String,
    pub is_favorite: bool,
    pub is_hidden: bool,
}

/// Ensure the `articles` table exists. Idempotent and safe to call at
/// startup. Articles themselves are populated by an external process.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), InsightError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS articles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            summary TEXT NOT NULL DEFAULT '',
            url TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL,
            is_favorite BOOLEAN NOT NULL DEFAULT FALSE,
            is_hidden BOOLEAN NOT NULL DEFAULT FALSE
        );
        "#,
    )
    .execute(pool)
    .await
    .map_err(store_err)?;

    info!("store: articles schema ensured");
    Ok(())
}

/// List all articles, newest `created_at` first. Hidden articles are
/// included; filtering is the renderer's responsibility so flag mutations
/// stay observable.
pub async fn list_articles(pool: &SqlitePool) -> Result<Vec<Article>, InsightError> {
    let articles = sqlx::query_as::<_, Article>(
        r#"
        SELECT id, title, summary, url, created_at, is_favorite, is_hidden
        FROM articles
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(store_err)?;

    debug!("store: listed {} articles", articles.len());
    Ok(articles)
}

/// Update the favorite flag for exactly the matching identifier.
/// Last write wins; there is no optimistic-concurrency check.
pub async fn set_favorite(pool: &SqlitePool, id: i64, value: bool) -> Result<(), InsightError> {
    sqlx::query("UPDATE articles SET is_favorite = ? WHERE id = ?")
        .bind(value)
        .bind(id)
        .execute(pool)
        .await
        .map_err(store_err)?;

    info!("store: article {} favorite -> {}", id, value);
    Ok(())
}

/// Update the hide flag for exactly the matching identifier. Hidden
/// articles remain in the store; they are only excluded from rendering.
pub async fn set_hidden(pool: &SqlitePool, id: i64, value: bool) -> Result<(), InsightError> {
    sqlx::query("UPDATE articles SET is_hidden = ? WHERE id = ?")
        .bind(value)
        .bind(id)
        .execute(pool)
        .await
        .map_err(store_err)?;

    info!("store: article {} hidden -> {}", id, value);
    Ok(())
}

/// Fetch a single article by id, if present.
pub async fn get_article(pool: &SqlitePool, id: i64) -> Result<Option<Article>, InsightError> {
    sqlx::query_as::<_, Article>(
        r#"
        SELECT id, title, summary, url, created_at, is_favorite, is_hidden
        FROM articles
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(store_err)
}

/// Insert an article. Used by tests and demo seeding; production rows come
/// from the external ingestion process.
pub async fn insert_article(
    pool: &SqlitePool,
    title: &str,
    summary: &str,
    url: &str,
    created_at: &str,
) -> Result<i64, InsightError> {
    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO articles (title, summary, url, created_at)
        VALUES (?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(title)
    .bind(summary)
    .bind(url)
    .bind(created_at)
    .fetch_one(pool)
    .await
    .map_err(store_err)
}

fn store_err(e: sqlx::Error) -> InsightError {
    InsightError::StoreUnavailable(e.to_string())
}
