//! Database schema migrations. Idempotent: safe to run on every start.

use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    apply_schema(&pool).await?;
    pool.close().await;
    Ok(())
}

/// Create the `strings` table and its indexes on an open pool.
pub async fn apply_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS strings (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            content_hash TEXT NOT NULL UNIQUE,
            value TEXT NOT NULL UNIQUE,
            length INTEGER NOT NULL,
            is_palindrome INTEGER NOT NULL,
            unique_characters INTEGER NOT NULL,
            word_count INTEGER NOT NULL,
            character_frequency_json TEXT NOT NULL,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_strings_is_palindrome ON strings(is_palindrome)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_strings_length ON strings(length)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_strings_word_count ON strings(word_count)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_strings_created_at ON strings(created_at DESC, seq DESC)",
    )
    .execute(pool)
    .await?;

    tracing::debug!("schema applied");
    Ok(())
}
