//! Vector store abstraction.
//!
//! The [`VectorStore`] trait is the single seam between the pipeline and
//! wherever chunk vectors live. The app crate provides a SQLite backend;
//! [`memory::InMemoryStore`] serves tests and ephemeral use.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Chunk, RetrievedChunk};

/// Abstract chunk + vector storage.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`add_chunks`](VectorStore::add_chunks) | Store chunks with their vectors |
/// | [`similarity_search`](VectorStore::similarity_search) | Top-k nearest chunks by cosine similarity |
/// | [`count`](VectorStore::count) | Number of stored vectors |
/// | [`delete_document`](VectorStore::delete_document) | Drop every chunk of a document |
/// | [`clear`](VectorStore::clear) | Drop the whole collection |
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Store `chunks` with `vectors[i]` belonging to `chunks[i]`.
    ///
    /// Returns the stored chunk ids. Fails if the slices differ in length.
    async fn add_chunks(&self, chunks: &[Chunk], vectors: &[Vec<f32>]) -> Result<Vec<String>>;

    /// Return at most `k` chunks ordered by descending similarity, ties
    /// broken by chunk id.
    async fn similarity_search(&self, query_vec: &[f32], k: usize)
        -> Result<Vec<RetrievedChunk>>;

    /// Number of vectors in the collection.
    async fn count(&self) -> Result<i64>;

    /// Remove all chunks of a document. Returns how many were removed.
    async fn delete_document(&self, document_id: &str) -> Result<u64>;

    /// Remove every chunk and vector.
    async fn clear(&self) -> Result<()>;
}

/// Reject chunk/vector slices that do not line up.
pub fn check_lengths(chunks: &[Chunk], vectors: &[Vec<f32>]) -> Result<()> {
    if chunks.len() != vectors.len() {
        anyhow::bail!(
            "got {} vectors for {} chunks",
            vectors.len(),
            chunks.len()
        );
    }
    Ok(())
}

/// Sort by score descending then chunk id, and keep the first `k`.
pub fn rank(candidates: &mut Vec<RetrievedChunk>, k: usize) {
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.chunk_id.cmp(&b.chunk_id))
    });
    candidates.truncate(k);
}
