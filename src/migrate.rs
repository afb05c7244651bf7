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

/// Create all tables and indexes. Idempotent.
pub async fn apply_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sections (
            key TEXT PRIMARY KEY,
            device_name TEXT NOT NULL,
            vendor TEXT NOT NULL,
            section_type TEXT NOT NULL,
            section_id TEXT NOT NULL,
            chunk_index INTEGER NOT NULL,
            file_path TEXT NOT NULL,
            text TEXT NOT NULL,
            raw_snippet TEXT NOT NULL,
            content_hash TEXT NOT NULL,
            updated_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS section_vectors (
            key TEXT PRIMARY KEY,
            model TEXT NOT NULL,
            dims INTEGER NOT NULL,
            embedding BLOB NOT NULL,
            content_hash TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            FOREIGN KEY (key) REFERENCES sections(key)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_sections_device ON sections(device_name)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_sections_vendor ON sections(vendor)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_sections_type ON sections(section_type)")
        .execute(pool)
        .await?;

    tracing::debug!("schema up to date");
    Ok(())
}
