//! Semantic search over stored sections.
//!
//! The query is embedded with the configured provider and compared by
//! cosine similarity against every stored vector that passes the
//! [`SectionFilter`]. Sections without a vector are invisible to search
//! until `ncx embed pending` has run.

use anyhow::{bail, Result};

use netcfg_index_core::embedding::EmbeddingProvider;
use netcfg_index_core::store::{SectionFilter, SectionHit, SectionStore};

use crate::config::Config;
use crate::db;
use crate::embedding;
use crate::sqlite_store::SqliteSectionStore;

pub const DEFAULT_LIMIT: usize = 10;

pub async fn search_sections(
    store: &dyn SectionStore,
    provider: &dyn EmbeddingProvider,
    query: &str,
    filter: &SectionFilter,
    limit: usize,
) -> Result<Vec<SectionHit>> {
    if query.trim().is_empty() {
        bail!("search query must not be empty");
    }
    let query_vec = embedding::embed_query(provider, query).await?;
    store
        .vector_search(&query_vec, provider.model_name(), filter, limit)
        .await
}

pub async fn run_search(
    config: &Config,
    query: &str,
    filter: SectionFilter,
    limit: Option<usize>,
) -> Result<()> {
    if !config.embedding.is_enabled() {
        bail!("Search requires an embedding provider. Set [embedding] provider in config.");
    }
    let provider = embedding::create_provider(&config.embedding)?;
    let pool = db::connect(config).await?;
    let store = SqliteSectionStore::new(pool);

    let hits = search_sections(
        &store,
        provider.as_ref(),
        query,
        &filter,
        limit.unwrap_or(DEFAULT_LIMIT),
    )
    .await;
    store.pool().close().await;
    let hits = hits?;

    if hits.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, hit) in hits.iter().enumerate() {
        let s = &hit.section;
        println!(
            "{}. [{:.2}] {} / {} {}",
            i + 1,
            hit.score,
            s.device_name,
            s.section_type,
            s.section_id
        );
        println!("    vendor: {}", s.vendor);
        println!("    file: {}", hit.file_path);
        println!(
            "    excerpt: \"{}\"",
            excerpt(&s.raw_snippet, 240).replace('\n', " ").trim()
        );
        println!("    key: {}", hit.key);
        println!();
    }

    Ok(())
}

fn excerpt(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
