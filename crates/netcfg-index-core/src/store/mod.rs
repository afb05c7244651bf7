//! Storage abstraction for netcfg-index.
//!
//! The [`SectionStore`] trait covers everything the ingest, embedding and
//! search commands need from a backend, so SQLite (in the app crate) and
//! the in-memory store here are interchangeable.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

use crate::models::{Section, SectionRecord, SectionType, Vendor};

/// Optional narrowing of a vector search.
#[derive(Debug, Clone, Default)]
pub struct SectionFilter {
    pub device_name: Option<String>,
    pub vendor: Option<Vendor>,
    pub section_type: Option<SectionType>,
}

impl SectionFilter {
    pub fn matches(&self, section: &Section) -> bool {
        self.device_name
            .as_deref()
            .map_or(true, |d| d == section.device_name)
            && self.vendor.map_or(true, |v| v == section.vendor)
            && self.section_type.map_or(true, |t| t == section.section_type)
    }
}

/// A section returned from vector search.
#[derive(Debug, Clone, Serialize)]
pub struct SectionHit {
    pub key: String,
    pub score: f32,
    pub file_path: String,
    pub section: Section,
}

/// Sort hits by descending score, ties broken by key, and keep `limit`.
pub fn rank_hits(hits: &mut Vec<SectionHit>, limit: usize) {
    hits.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.key.cmp(&b.key))
    });
    hits.truncate(limit);
}

/// Abstract storage backend.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`replace_device_sections`](SectionStore::replace_device_sections) | Atomically swap all sections of one device |
/// | [`upsert_embedding`](SectionStore::upsert_embedding) | Attach a vector to a stored section |
/// | [`get_section`](SectionStore::get_section) | Fetch one section by storage key |
/// | [`sections_missing_embeddings`](SectionStore::sections_missing_embeddings) | Sections with no vector or a stale one |
/// | [`vector_search`](SectionStore::vector_search) | Cosine similarity search |
#[async_trait]
pub trait SectionStore: Send + Sync {
    /// Replace every section (and vector) of `device_name` with `records`.
    /// Records carrying an embedding have it stored alongside.
    async fn replace_device_sections(
        &self,
        device_name: &str,
        records: &[SectionRecord],
    ) -> Result<()>;

    /// Store a vector for an existing section, stamped with the section's
    /// current content hash. Errors if the key is unknown.
    async fn upsert_embedding(&self, key: &str, vector: &[f32], model: &str) -> Result<()>;

    /// Fetch a section by key. The returned record never carries its vector.
    async fn get_section(&self, key: &str) -> Result<Option<SectionRecord>>;

    /// Sections with no vector, or whose vector was computed from different
    /// text or by a model other than `model`, ordered by key.
    async fn sections_missing_embeddings(
        &self,
        model: &str,
        limit: usize,
    ) -> Result<Vec<SectionRecord>>;

    /// Top `limit` sections by cosine similarity to `query_vec`. Only
    /// vectors produced by `model` are compared.
    async fn vector_search(
        &self,
        query_vec: &[f32],
        model: &str,
        filter: &SectionFilter,
        limit: usize,
    ) -> Result<Vec<SectionHit>>;
}
