//! SQLite-backed [`SectionStore`] implementation.
//!
//! Sections live in `sections`, vectors in `section_vectors` as
//! little-endian f32 BLOBs. Vector search is brute-force cosine over the
//! rows that pass the filter.

use anyhow::{bail, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use netcfg_index_core::embedding::{blob_to_vec, cosine_similarity, vec_to_blob};
use netcfg_index_core::models::{Section, SectionRecord, SectionType, Vendor};
use netcfg_index_core::store::{rank_hits, SectionFilter, SectionHit, SectionStore};

pub struct SqliteSectionStore {
    pool: SqlitePool,
}

impl SqliteSectionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Count of stored sections and of sections with a vector.
    pub async fn counts(&self) -> Result<(i64, i64)> {
        let sections: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sections")
            .fetch_one(&self.pool)
            .await?;
        let vectors: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM section_vectors")
            .fetch_one(&self.pool)
            .await?;
        Ok((sections, vectors))
    }
}

const SECTION_COLUMNS: &str = "s.key, s.device_name, s.vendor, s.section_type, s.section_id, \
     s.chunk_index, s.file_path, s.text, s.raw_snippet, s.content_hash";

fn row_to_record(row: &SqliteRow) -> Result<SectionRecord> {
    let section_type: String = row.get("section_type");
    let section_type: SectionType = section_type.parse().map_err(anyhow::Error::msg)?;
    let vendor: String = row.get("vendor");
    let chunk_index: i64 = row.get("chunk_index");

    let section = Section {
        device_name: row.get("device_name"),
        vendor: Vendor::parse(&vendor),
        section_type,
        section_id: row.get("section_id"),
        chunk_index: u32::try_from(chunk_index)?,
        text: row.get("text"),
        raw_snippet: row.get("raw_snippet"),
    };

    Ok(SectionRecord {
        key: row.get("key"),
        section,
        file_path: row.get("file_path"),
        content_hash: row.get("content_hash"),
        embedding: None,
    })
}

#[async_trait]
impl SectionStore for SqliteSectionStore {
    async fn replace_device_sections(
        &self,
        device_name: &str,
        records: &[SectionRecord],
    ) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "DELETE FROM section_vectors WHERE key IN (SELECT key FROM sections WHERE device_name = ?)",
        )
        .bind(device_name)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM sections WHERE device_name = ?")
            .bind(device_name)
            .execute(&mut *tx)
            .await?;

        for record in records {
            let s = &record.section;
            sqlx::query(
                r#"
                INSERT INTO sections (key, device_name, vendor, section_type, section_id,
                                      chunk_index, file_path, text, raw_snippet,
                                      content_hash, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&record.key)
            .bind(&s.device_name)
            .bind(s.vendor.as_str())
            .bind(s.section_type.as_str())
            .bind(&s.section_id)
            .bind(i64::from(s.chunk_index))
            .bind(&record.file_path)
            .bind(&s.text)
            .bind(&s.raw_snippet)
            .bind(&record.content_hash)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            if let Some(embedding) = &record.embedding {
                sqlx::query(
                    r#"
                    INSERT INTO section_vectors (key, model, dims, embedding, content_hash, created_at)
                    VALUES (?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(&record.key)
                .bind(&embedding.model)
                .bind(embedding.vector.len() as i64)
                .bind(vec_to_blob(&embedding.vector))
                .bind(&record.content_hash)
                .bind(now)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn upsert_embedding(&self, key: &str, vector: &[f32], model: &str) -> Result<()> {
        let content_hash: Option<String> =
            sqlx::query_scalar("SELECT content_hash FROM sections WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        let Some(content_hash) = content_hash else {
            bail!("no section stored under key '{}'", key);
        };

        sqlx::query(
            r#"
            INSERT INTO section_vectors (key, model, dims, embedding, content_hash, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                model = excluded.model,
                dims = excluded.dims,
                embedding = excluded.embedding,
                content_hash = excluded.content_hash,
                created_at = excluded.created_at
            "#,
        )
        .bind(key)
        .bind(model)
        .bind(vector.len() as i64)
        .bind(vec_to_blob(vector))
        .bind(&content_hash)
        .bind(chrono::Utc::now().timestamp())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_section(&self, key: &str) -> Result<Option<SectionRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM sections s WHERE s.key = ?",
            SECTION_COLUMNS
        ))
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_record).transpose()
    }

    async fn sections_missing_embeddings(
        &self,
        model: &str,
        limit: usize,
    ) -> Result<Vec<SectionRecord>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM sections s
            LEFT JOIN section_vectors v ON v.key = s.key
            WHERE v.key IS NULL OR v.content_hash != s.content_hash OR v.model != ?
            ORDER BY s.key
            LIMIT ?
            "#,
            SECTION_COLUMNS
        ))
        .bind(model)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_record).collect()
    }

    async fn vector_search(
        &self,
        query_vec: &[f32],
        model: &str,
        filter: &SectionFilter,
        limit: usize,
    ) -> Result<Vec<SectionHit>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {}, v.embedding FROM sections s JOIN section_vectors v ON v.key = s.key WHERE v.model = ",
            SECTION_COLUMNS
        ));
        qb.push_bind(model.to_string());
        if let Some(device) = &filter.device_name {
            qb.push(" AND s.device_name = ").push_bind(device.clone());
        }
        if let Some(vendor) = filter.vendor {
            qb.push(" AND s.vendor = ").push_bind(vendor.as_str());
        }
        if let Some(section_type) = filter.section_type {
            qb.push(" AND s.section_type = ").push_bind(section_type.as_str());
        }

        let rows = qb.build().fetch_all(&self.pool).await?;

        let mut hits = Vec::with_capacity(rows.len());
        for row in &rows {
            let blob: Vec<u8> = row.get("embedding");
            let record = row_to_record(row)?;
            hits.push(SectionHit {
                score: cosine_similarity(query_vec, &blob_to_vec(&blob)),
                key: record.key,
                file_path: record.file_path,
                section: record.section,
            });
        }

        rank_hits(&mut hits, limit);
        Ok(hits)
    }
}
