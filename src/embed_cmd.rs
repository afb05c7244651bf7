use anyhow::{bail, Result};

use netcfg_index_core::embedding::{embed_in_batches, EmbeddingProvider};
use netcfg_index_core::store::SectionStore;

use crate::config::Config;
use crate::db;
use crate::embedding;
use crate::sqlite_store::SqliteSectionStore;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EmbedStats {
    pub pending: usize,
    pub embedded: usize,
    pub failed: usize,
}

/// Embed sections that have no vector or a stale one. A failed batch is
/// logged and counted; the remaining batches still run.
pub async fn embed_pending(
    store: &dyn SectionStore,
    provider: &dyn EmbeddingProvider,
    limit: Option<usize>,
    batch_size: usize,
) -> Result<EmbedStats> {
    if batch_size == 0 {
        bail!("batch size must be > 0");
    }
    let pending = store
        .sections_missing_embeddings(provider.model_name(), limit.unwrap_or(usize::MAX))
        .await?;

    let mut stats = EmbedStats {
        pending: pending.len(),
        ..Default::default()
    };

    for batch in pending.chunks(batch_size) {
        let texts: Vec<String> = batch.iter().map(|r| r.section.text.clone()).collect();

        match embed_in_batches(provider, &texts, batch_size).await {
            Ok(vectors) => {
                for (record, vec) in batch.iter().zip(vectors.iter()) {
                    store
                        .upsert_embedding(&record.key, vec, provider.model_name())
                        .await?;
                    stats.embedded += 1;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, size = batch.len(), "embedding batch failed");
                stats.failed += batch.len();
            }
        }
    }

    Ok(stats)
}

pub async fn run_embed_pending(
    config: &Config,
    limit: Option<usize>,
    batch_size_override: Option<usize>,
    dry_run: bool,
) -> Result<()> {
    if !config.embedding.is_enabled() {
        bail!("Embedding provider is disabled. Set [embedding] provider in config.");
    }

    let pool = db::connect(config).await?;
    let store = SqliteSectionStore::new(pool);
    let batch_size = batch_size_override.unwrap_or(config.embedding.batch_size);

    if dry_run {
        let model = config.embedding.model.as_deref().unwrap_or_default();
        let pending = store
            .sections_missing_embeddings(model, limit.unwrap_or(usize::MAX))
            .await?;
        println!("embed pending (dry-run)");
        println!("  sections needing embeddings: {}", pending.len());
        store.pool().close().await;
        return Ok(());
    }

    let provider = embedding::create_provider(&config.embedding)?;
    let stats = embed_pending(&store, provider.as_ref(), limit, batch_size).await?;

    println!("embed pending");
    if stats.pending == 0 {
        println!("  all sections up to date");
    } else {
        println!("  total pending: {}", stats.pending);
        println!("  embedded: {}", stats.embedded);
        println!("  failed: {}", stats.failed);
    }

    store.pool().close().await;
    Ok(())
}
