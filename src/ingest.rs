//! Ingestion pipeline orchestration.
//!
//! Coordinates the full flow for every configuration file found by the
//! filesystem connector: read → mask → segment → embed → store.
//!
//! Failures are contained per document: an unreadable file or a store
//! error is logged and counted, and the next file is processed. An
//! embedding failure is not a document failure; the sections are stored
//! without vectors and picked up later by `ncx embed pending`.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;

use netcfg_index_core::embedding::{embed_in_batches, EmbeddingProvider};
use netcfg_index_core::mask::normalize_and_mask;
use netcfg_index_core::models::{ConfigDocument, Section, SectionRecord};
use netcfg_index_core::segment::segment_config;
use netcfg_index_core::store::SectionStore;

use crate::config::Config;
use crate::connector_fs;
use crate::db;
use crate::embedding;
use crate::migrate;
use crate::sqlite_store::SqliteSectionStore;

/// Mask and segment one document.
pub fn sections_for(doc: &ConfigDocument) -> Vec<Section> {
    let masked = normalize_and_mask(&doc.raw_text);
    segment_config(&masked, &doc.device_name, doc.vendor)
}

/// Result of ingesting a single document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentOutcome {
    /// The document produced no sections and was not stored.
    Empty,
    Stored { sections: usize, embedded: usize },
}

/// Totals for one `ncx ingest` run.
#[derive(Debug, Default, Clone, Serialize, PartialEq, Eq)]
pub struct IngestStats {
    pub files: usize,
    pub documents: usize,
    pub sections: usize,
    pub embedded: usize,
    pub pending: usize,
    pub empty: usize,
    pub failed: usize,
}

impl IngestStats {
    fn record(&mut self, outcome: DocumentOutcome) {
        match outcome {
            DocumentOutcome::Empty => self.empty += 1,
            DocumentOutcome::Stored { sections, embedded } => {
                self.documents += 1;
                self.sections += sections;
                self.embedded += embedded;
                self.pending += sections - embedded;
            }
        }
    }
}

/// Segment, optionally embed, and store one document, replacing whatever
/// was stored for the device before.
pub async fn ingest_document(
    doc: &ConfigDocument,
    store: &dyn SectionStore,
    provider: Option<&dyn EmbeddingProvider>,
    batch_size: usize,
) -> Result<DocumentOutcome> {
    let sections = sections_for(doc);
    if sections.is_empty() {
        tracing::warn!(device = %doc.device_name, path = %doc.file_path, "no sections produced, skipping");
        return Ok(DocumentOutcome::Empty);
    }

    let mut records: Vec<SectionRecord> = sections
        .into_iter()
        .map(|s| SectionRecord::new(s, &doc.file_path))
        .collect();

    let mut embedded = 0;
    if let Some(provider) = provider {
        let texts: Vec<String> = records.iter().map(|r| r.section.text.clone()).collect();
        match embed_in_batches(provider, &texts, batch_size).await {
            Ok(vectors) => {
                let model = provider.model_name().to_string();
                records = records
                    .into_iter()
                    .zip(vectors)
                    .map(|(r, v)| r.with_embedding(&model, v))
                    .collect();
                embedded = records.len();
            }
            Err(e) => {
                tracing::warn!(
                    device = %doc.device_name,
                    error = %e,
                    "embedding failed, storing sections without vectors"
                );
            }
        }
    }

    store
        .replace_device_sections(&doc.device_name, &records)
        .await?;

    tracing::info!(
        device = %doc.device_name,
        vendor = %doc.vendor,
        sections = records.len(),
        embedded,
        "ingested"
    );

    Ok(DocumentOutcome::Stored {
        sections: records.len(),
        embedded,
    })
}

/// Ingest a list of already-loaded documents. Per-document errors are
/// logged and counted in `failed`. A document whose device name was already
/// ingested in this run is skipped as a failure, since storing it would
/// replace the earlier device's sections.
pub async fn ingest_documents(
    docs: &[ConfigDocument],
    store: &dyn SectionStore,
    provider: Option<&dyn EmbeddingProvider>,
    batch_size: usize,
) -> IngestStats {
    let mut stats = IngestStats {
        files: docs.len(),
        ..Default::default()
    };
    let mut seen: HashMap<&str, &str> = HashMap::new();
    for doc in docs {
        if let Some(first) = seen.get(doc.device_name.as_str()) {
            tracing::error!(
                device = %doc.device_name,
                path = %doc.file_path,
                first = %first,
                "duplicate device name, skipping"
            );
            stats.failed += 1;
            continue;
        }
        seen.insert(&doc.device_name, &doc.file_path);

        match ingest_document(doc, store, provider, batch_size).await {
            Ok(outcome) => stats.record(outcome),
            Err(e) => {
                tracing::error!(device = %doc.device_name, path = %doc.file_path, error = %e, "failed to ingest");
                stats.failed += 1;
            }
        }
    }
    stats
}

pub async fn run_ingest(config: &Config, dry_run: bool, limit: Option<usize>) -> Result<IngestStats> {
    let mut files = connector_fs::scan_filesystem(&config.filesystem())?;
    if let Some(lim) = limit {
        files.truncate(lim);
    }
    tracing::info!(count = files.len(), "found config files");

    let mut docs = Vec::with_capacity(files.len());
    let mut unreadable = 0;
    for file in &files {
        match connector_fs::load_document(file) {
            Ok(doc) => docs.push(doc),
            Err(e) => {
                tracing::error!(path = %file.path.display(), error = %e, "failed to read");
                unreadable += 1;
            }
        }
    }

    if dry_run {
        let sections: usize = docs.iter().map(|d| sections_for(d).len()).sum();
        println!("ingest (dry-run)");
        println!("  files found: {}", files.len());
        println!("  estimated sections: {}", sections);
        return Ok(IngestStats {
            files: files.len(),
            sections,
            failed: unreadable,
            ..Default::default()
        });
    }

    let provider = if config.embedding.is_enabled() {
        match embedding::create_provider(&config.embedding) {
            Ok(p) => Some(p),
            Err(e) => {
                tracing::warn!(error = %e, "could not create embedding provider, storing without vectors");
                None
            }
        }
    } else {
        None
    };

    let pool = db::connect(config).await?;
    migrate::apply_schema(&pool).await?;
    let store = SqliteSectionStore::new(pool);

    let mut stats = ingest_documents(
        &docs,
        &store,
        provider.as_deref(),
        config.embedding.batch_size,
    )
    .await;
    stats.files = files.len();
    stats.failed += unreadable;

    println!("ingest");
    println!("  files: {}", stats.files);
    println!("  devices stored: {}", stats.documents);
    println!("  sections written: {}", stats.sections);
    if config.embedding.is_enabled() {
        println!("  embeddings written: {}", stats.embedded);
        println!("  embeddings pending: {}", stats.pending);
    }
    println!("  empty: {}", stats.empty);
    println!("  failed: {}", stats.failed);

    store.pool().close().await;
    Ok(stats)
}
