//! In-memory [`SectionStore`] implementation for tests and dry runs.
//!
//! Uses a `BTreeMap` behind `std::sync::RwLock`, so iteration is in key
//! order. Vector search is brute-force cosine similarity.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;

use crate::embedding::cosine_similarity;
use crate::models::{SectionEmbedding, SectionRecord};

use super::{rank_hits, SectionFilter, SectionHit, SectionStore};

struct StoredVector {
    embedding: SectionEmbedding,
    content_hash: String,
}

struct Entry {
    record: SectionRecord,
    vector: Option<StoredVector>,
}

impl Entry {
    fn is_stale(&self, model: &str) -> bool {
        self.vector.as_ref().map_or(true, |v| {
            v.content_hash != self.record.content_hash || v.embedding.model != model
        })
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    entries: RwLock<BTreeMap<String, Entry>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<String, Entry>>> {
        self.entries
            .read()
            .map_err(|_| anyhow!("in-memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<String, Entry>>> {
        self.entries
            .write()
            .map_err(|_| anyhow!("in-memory store lock poisoned"))
    }

    /// Number of stored sections.
    pub fn len(&self) -> usize {
        self.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn without_vector(record: &SectionRecord) -> SectionRecord {
    SectionRecord {
        embedding: None,
        ..record.clone()
    }
}

#[async_trait]
impl SectionStore for InMemoryStore {
    async fn replace_device_sections(
        &self,
        device_name: &str,
        records: &[SectionRecord],
    ) -> Result<()> {
        let mut entries = self.write()?;
        entries.retain(|_, e| e.record.section.device_name != device_name);
        for record in records {
            let vector = record.embedding.clone().map(|embedding| StoredVector {
                embedding,
                content_hash: record.content_hash.clone(),
            });
            entries.insert(
                record.key.clone(),
                Entry {
                    record: without_vector(record),
                    vector,
                },
            );
        }
        Ok(())
    }

    async fn upsert_embedding(&self, key: &str, vector: &[f32], model: &str) -> Result<()> {
        let mut entries = self.write()?;
        let Some(entry) = entries.get_mut(key) else {
            bail!("no section stored under key '{}'", key);
        };
        entry.vector = Some(StoredVector {
            embedding: SectionEmbedding {
                model: model.to_string(),
                vector: vector.to_vec(),
            },
            content_hash: entry.record.content_hash.clone(),
        });
        Ok(())
    }

    async fn get_section(&self, key: &str) -> Result<Option<SectionRecord>> {
        Ok(self.read()?.get(key).map(|e| e.record.clone()))
    }

    async fn sections_missing_embeddings(
        &self,
        model: &str,
        limit: usize,
    ) -> Result<Vec<SectionRecord>> {
        Ok(self
            .read()?
            .values()
            .filter(|e| e.is_stale(model))
            .take(limit)
            .map(|e| e.record.clone())
            .collect())
    }

    async fn vector_search(
        &self,
        query_vec: &[f32],
        model: &str,
        filter: &SectionFilter,
        limit: usize,
    ) -> Result<Vec<SectionHit>> {
        let entries = self.read()?;
        let mut hits: Vec<SectionHit> = entries
            .values()
            .filter(|e| filter.matches(&e.record.section))
            .filter_map(|e| {
                let v = e.vector.as_ref().filter(|v| v.embedding.model == model)?;
                Some(SectionHit {
                    key: e.record.key.clone(),
                    score: cosine_similarity(query_vec, &v.embedding.vector),
                    file_path: e.record.file_path.clone(),
                    section: e.record.section.clone(),
                })
            })
            .collect();
        rank_hits(&mut hits, limit);
        Ok(hits)
    }
}
