//! SQLite-backed [`VectorStore`] implementation.
//!
//! Chunks live in `chunks`, their vectors as little-endian f32 BLOBs in
//! `chunk_vectors`. Search is brute-force cosine similarity over every
//! stored vector, which is fine at the scale of a personal upload folder.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use docqa_core::embedding::{blob_to_vec, cosine_similarity, vec_to_blob};
use docqa_core::models::{Chunk, ChunkMetadata, RetrievedChunk};
use docqa_core::store::{check_lengths, rank, VectorStore};

pub struct SqliteStore {
    pool: SqlitePool,
    model: String,
}

impl SqliteStore {
    /// `model` is recorded next to each vector so a later provider switch
    /// can be spotted in the database.
    pub fn new(pool: SqlitePool, model: impl Into<String>) -> Self {
        Self {
            pool,
            model: model.into(),
        }
    }

    /// Number of rows in `chunks`.
    pub async fn chunk_count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chunks")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl VectorStore for SqliteStore {
    async fn add_chunks(&self, chunks: &[Chunk], vectors: &[Vec<f32>]) -> Result<Vec<String>> {
        check_lengths(chunks, vectors)?;

        let mut tx = self.pool.begin().await?;
        let mut ids = Vec::with_capacity(chunks.len());

        for (chunk, vector) in chunks.iter().zip(vectors) {
            let metadata_json = serde_json::to_string(&chunk.metadata)?;
            sqlx::query(
                r#"
                INSERT INTO chunks (id, document_id, chunk_index, text, hash, metadata_json)
                VALUES (?, ?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    text = excluded.text,
                    hash = excluded.hash,
                    metadata_json = excluded.metadata_json
                "#,
            )
            .bind(&chunk.id)
            .bind(&chunk.document_id)
            .bind(chunk.chunk_index)
            .bind(&chunk.text)
            .bind(&chunk.hash)
            .bind(&metadata_json)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO chunk_vectors (chunk_id, document_id, embedding, model, dims)
                VALUES (?, ?, ?, ?, ?)
                ON CONFLICT(chunk_id) DO UPDATE SET
                    document_id = excluded.document_id,
                    embedding = excluded.embedding,
                    model = excluded.model,
                    dims = excluded.dims
                "#,
            )
            .bind(&chunk.id)
            .bind(&chunk.document_id)
            .bind(vec_to_blob(vector))
            .bind(&self.model)
            .bind(vector.len() as i64)
            .execute(&mut *tx)
            .await?;

            ids.push(chunk.id.clone());
        }

        tx.commit().await?;
        tracing::debug!(count = ids.len(), "stored chunk vectors");
        Ok(ids)
    }

    async fn similarity_search(
        &self,
        query_vec: &[f32],
        k: usize,
    ) -> Result<Vec<RetrievedChunk>> {
        let rows = sqlx::query(
            r#"
            SELECT cv.chunk_id, cv.document_id, cv.embedding, c.text, c.metadata_json
            FROM chunk_vectors cv
            JOIN chunks c ON c.id = cv.chunk_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut candidates = Vec::with_capacity(rows.len());
        for row in &rows {
            let blob: Vec<u8> = row.get("embedding");
            let metadata_json: String = row.get("metadata_json");
            let chunk_id: String = row.get("chunk_id");
            let metadata: ChunkMetadata = serde_json::from_str(&metadata_json)
                .with_context(|| format!("Corrupt metadata for chunk {}", chunk_id))?;
            candidates.push(RetrievedChunk {
                chunk_id,
                document_id: row.get("document_id"),
                content: row.get("text"),
                metadata,
                score: cosine_similarity(query_vec, &blob_to_vec(&blob)) as f64,
            });
        }

        rank(&mut candidates, k);
        Ok(candidates)
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chunk_vectors")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn delete_document(&self, document_id: &str) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM chunk_vectors WHERE document_id = ?")
            .bind(document_id)
            .execute(&mut *tx)
            .await?;
        let removed = sqlx::query("DELETE FROM chunks WHERE document_id = ?")
            .bind(document_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tx.commit().await?;
        Ok(removed)
    }

    async fn clear(&self) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM chunk_vectors")
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM chunks").execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrate::create_tables;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_store() -> SqliteStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        create_tables(&pool).await.unwrap();
        SqliteStore::new(pool, "test-model")
    }

    fn chunk(id: &str, doc: &str, index: i64, text: &str) -> Chunk {
        Chunk {
            id: id.to_string(),
            document_id: doc.to_string(),
            chunk_index: index,
            text: text.to_string(),
            hash: docqa_core::chunk::content_hash(text),
            metadata: ChunkMetadata {
                filename: format!("{}.py", doc),
                source: format!("uploads/{}.py", doc),
                file_type: ".py".to_string(),
                document_id: doc.to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_add_and_search() {
        let store = memory_store().await;
        let ids = store
            .add_chunks(
                &[
                    chunk("a", "d1", 0, "def add(a, b):"),
                    chunk("b", "d1", 1, "class Stack:"),
                    chunk("c", "d2", 0, "import os"),
                ],
                &[vec![1.0, 0.0], vec![0.0, 1.0], vec![0.6, 0.8]],
            )
            .await
            .unwrap();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(store.count().await.unwrap(), 3);

        let hits = store.similarity_search(&[0.0, 1.0], 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].chunk_id, "b");
        assert_eq!(hits[0].content, "class Stack:");
        assert_eq!(hits[1].chunk_id, "c");
        assert_eq!(hits[1].metadata.filename, "d2.py");
        assert!((hits[0].score - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_mismatched_lengths_write_nothing() {
        let store = memory_store().await;
        assert!(store
            .add_chunks(&[chunk("a", "d1", 0, "x")], &[])
            .await
            .is_err());
        assert_eq!(store.chunk_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_document_and_clear() {
        let store = memory_store().await;
        store
            .add_chunks(
                &[
                    chunk("a", "d1", 0, "one"),
                    chunk("b", "d1", 1, "two"),
                    chunk("c", "d2", 0, "three"),
                ],
                &[vec![1.0], vec![1.0], vec![1.0]],
            )
            .await
            .unwrap();

        assert_eq!(store.delete_document("d1").await.unwrap(), 2);
        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(store.delete_document("missing").await.unwrap(), 0);

        store.clear().await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
        assert_eq!(store.chunk_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_search_empty_store() {
        let store = memory_store().await;
        assert!(store.similarity_search(&[1.0], 4).await.unwrap().is_empty());
    }
}
