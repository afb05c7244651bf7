//! Embedding provider trait and vector utilities.
//!
//! Defines the [`EmbeddingProvider`] trait that all embedding backends
//! implement, plus pure helpers for vector serialization and similarity.
//!
//! Concrete providers (disabled, OpenAI) live in the `netcfg-index` app
//! crate; the core never constructs HTTP clients.

use anyhow::{bail, Result};
use async_trait::async_trait;

/// Trait for embedding providers.
///
/// `embed` takes section texts (header plus snippet) and returns one
/// vector per input, in input order.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Model identifier (e.g. `"text-embedding-3-small"`).
    fn model_name(&self) -> &str;
    /// Vector dimensionality (e.g. `1536`).
    fn dims(&self) -> usize;
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Embed `texts` in batches of at most `batch_size`, checking that the
/// provider returned one vector of the right length per input.
pub async fn embed_in_batches(
    provider: &dyn EmbeddingProvider,
    texts: &[String],
    batch_size: usize,
) -> Result<Vec<Vec<f32>>> {
    if batch_size == 0 {
        bail!("embedding batch size must be greater than zero");
    }
    let mut out = Vec::with_capacity(texts.len());
    for batch in texts.chunks(batch_size) {
        let vectors = provider.embed(batch).await?;
        if vectors.len() != batch.len() {
            bail!(
                "embedding provider returned {} vectors for {} inputs",
                vectors.len(),
                batch.len()
            );
        }
        if let Some(bad) = vectors.iter().find(|v| v.len() != provider.dims()) {
            bail!(
                "embedding provider returned a {}-dim vector, expected {}",
                bad.len(),
                provider.dims()
            );
        }
        out.extend(vectors);
    }
    Ok(out)
}

/// Encode a float vector as a BLOB (little-endian f32 bytes).
///
/// ```rust
/// use netcfg_index_core::embedding::{blob_to_vec, vec_to_blob};
///
/// let v = vec![1.0f32, -2.5, 3.125];
/// let blob = vec_to_blob(&v);
/// assert_eq!(blob.len(), 12);
/// assert_eq!(blob_to_vec(&blob), v);
/// ```
pub fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vec.len() * 4);
    for &v in vec {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

/// Decode a BLOB produced by [`vec_to_blob`]. Trailing bytes that do not
/// form a whole `f32` are ignored.
pub fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Cosine similarity in `[-1.0, 1.0]`; `0.0` for empty, zero-norm or
/// mismatched vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return 0.0;
    }

    dot / denom
}
