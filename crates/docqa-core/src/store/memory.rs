//! In-memory [`VectorStore`] implementation.
//!
//! Keeps chunks and vectors in a `Vec` behind `std::sync::RwLock`.
//! Search is brute-force cosine similarity over every stored vector.

use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::embedding::cosine_similarity;
use crate::models::{Chunk, RetrievedChunk};

use super::{check_lengths, rank, VectorStore};

struct StoredChunk {
    chunk: Chunk,
    vector: Vec<f32>,
}

/// In-memory vector store for tests and one-shot sessions.
pub struct InMemoryStore {
    entries: RwLock<Vec<StoredChunk>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: T) -> anyhow::Error {
    anyhow!("in-memory store lock poisoned")
}

#[async_trait]
impl VectorStore for InMemoryStore {
    async fn add_chunks(&self, chunks: &[Chunk], vectors: &[Vec<f32>]) -> Result<Vec<String>> {
        check_lengths(chunks, vectors)?;
        let mut entries = self.entries.write().map_err(poisoned)?;
        let mut ids = Vec::with_capacity(chunks.len());
        for (chunk, vector) in chunks.iter().zip(vectors) {
            entries.retain(|e| e.chunk.id != chunk.id);
            entries.push(StoredChunk {
                chunk: chunk.clone(),
                vector: vector.clone(),
            });
            ids.push(chunk.id.clone());
        }
        Ok(ids)
    }

    async fn similarity_search(
        &self,
        query_vec: &[f32],
        k: usize,
    ) -> Result<Vec<RetrievedChunk>> {
        let entries = self.entries.read().map_err(poisoned)?;
        let mut candidates: Vec<RetrievedChunk> = entries
            .iter()
            .map(|e| RetrievedChunk {
                chunk_id: e.chunk.id.clone(),
                document_id: e.chunk.document_id.clone(),
                content: e.chunk.text.clone(),
                metadata: e.chunk.metadata.clone(),
                score: cosine_similarity(query_vec, &e.vector) as f64,
            })
            .collect();
        rank(&mut candidates, k);
        Ok(candidates)
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.entries.read().map_err(poisoned)?.len() as i64)
    }

    async fn delete_document(&self, document_id: &str) -> Result<u64> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        let before = entries.len();
        entries.retain(|e| e.chunk.document_id != document_id);
        Ok((before - entries.len()) as u64)
    }

    async fn clear(&self) -> Result<()> {
        self.entries.write().map_err(poisoned)?.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChunkMetadata;

    fn chunk(id: &str, doc: &str, text: &str) -> Chunk {
        Chunk {
            id: id.to_string(),
            document_id: doc.to_string(),
            chunk_index: 0,
            text: text.to_string(),
            hash: String::new(),
            metadata: ChunkMetadata {
                filename: format!("{}.md", doc),
                source: format!("uploads/{}.md", doc),
                file_type: ".md".to_string(),
                document_id: doc.to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_search_orders_by_similarity() {
        let store = InMemoryStore::new();
        store
            .add_chunks(
                &[
                    chunk("c1", "d1", "east"),
                    chunk("c2", "d1", "north"),
                    chunk("c3", "d2", "north-east"),
                ],
                &[vec![1.0, 0.0], vec![0.0, 1.0], vec![0.7, 0.7]],
            )
            .await
            .unwrap();

        let hits = store.similarity_search(&[0.0, 1.0], 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].chunk_id, "c2");
        assert_eq!(hits[1].chunk_id, "c3");
        assert!(hits[0].score >= hits[1].score);
        assert_eq!(hits[1].metadata.filename, "d2.md");
    }

    #[tokio::test]
    async fn test_k_larger_than_store() {
        let store = InMemoryStore::new();
        store
            .add_chunks(&[chunk("c1", "d1", "only")], &[vec![1.0]])
            .await
            .unwrap();
        let hits = store.similarity_search(&[1.0], 10).await.unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn test_length_mismatch_rejected() {
        let store = InMemoryStore::new();
        let err = store
            .add_chunks(&[chunk("c1", "d1", "x")], &[])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("0 vectors for 1 chunks"));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_and_clear() {
        let store = InMemoryStore::new();
        store
            .add_chunks(
                &[chunk("c1", "d1", "a"), chunk("c2", "d2", "b")],
                &[vec![1.0], vec![1.0]],
            )
            .await
            .unwrap();
        assert_eq!(store.delete_document("d1").await.unwrap(), 1);
        assert_eq!(store.count().await.unwrap(), 1);
        store.clear().await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
