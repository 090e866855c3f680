//! Retrieval-augmented answering.
//!
//! [`RagEngine`] composes the three seams of the query path: embed the
//! question, fetch the `k` nearest chunks from the [`VectorStore`], and
//! fill the prompt template for the [`ChatModel`]. Without a chat model the
//! engine still retrieves and returns the context with a fallback answer.

use std::sync::Arc;

use anyhow::Result;
use thiserror::Error;

use crate::embedding::{embed_query, EmbeddingProvider};
use crate::llm::ChatModel;
use crate::models::{Answer, RetrievedChunk, Source};
use crate::prompt::{build_prompt, format_context};
use crate::store::VectorStore;

/// Number of chunks retrieved when the caller does not say.
pub const DEFAULT_K: usize = 4;
/// Largest accepted `k`.
pub const MAX_K: usize = 10;

/// Answer returned when no chat model is configured.
pub const FALLBACK_ANSWER: &str = "Language model not configured. Showing relevant context only. \
To get generated answers, set the API key environment variable named by llm.api_key_env \
(GOOGLE_API_KEY by default).";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("query must not be empty")]
    EmptyQuery,

    #[error("k must be between 1 and {max}, got {k}")]
    KOutOfRange { k: usize, max: usize },
}

/// Check a question and `k` before any work is done.
pub fn validate_query(question: &str, k: usize) -> Result<(), QueryError> {
    if question.trim().is_empty() {
        return Err(QueryError::EmptyQuery);
    }
    if k == 0 || k > MAX_K {
        return Err(QueryError::KOutOfRange { k, max: MAX_K });
    }
    Ok(())
}

pub struct RagEngine {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    chat: Option<Arc<dyn ChatModel>>,
}

impl RagEngine {
    pub fn new(
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        chat: Option<Arc<dyn ChatModel>>,
    ) -> Self {
        Self {
            store,
            embedder,
            chat,
        }
    }

    /// Embed `question` and return the `k` most similar chunks.
    pub async fn retrieve(&self, question: &str, k: usize) -> Result<Vec<RetrievedChunk>> {
        validate_query(question, k)?;
        tracing::debug!(k, "retrieving context for query");
        let query_vec = embed_query(self.embedder.as_ref(), question).await?;
        let hits = self.store.similarity_search(&query_vec, k).await?;
        tracing::debug!(hits = hits.len(), "retrieved context");
        Ok(hits)
    }

    /// Retrieve context and generate an answer grounded in it.
    pub async fn answer(&self, question: &str, k: usize) -> Result<Answer> {
        let hits = self.retrieve(question, k).await?;
        let sources: Vec<Source> = hits.iter().map(Source::from).collect();

        let chat = match &self.chat {
            Some(chat) => chat,
            None => {
                tracing::warn!("no chat model configured, returning context only");
                return Ok(Answer {
                    query: question.to_string(),
                    answer: FALLBACK_ANSWER.to_string(),
                    sources,
                    generated: false,
                });
            }
        };

        let prompt = build_prompt(&format_context(&hits), question);
        tracing::info!(model = chat.model_name(), "generating answer");
        let answer = chat.generate(&prompt).await?;

        Ok(Answer {
            query: question.to_string(),
            answer,
            sources,
            generated: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Chunk, ChunkMetadata};
    use crate::store::memory::InMemoryStore;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Maps text onto two axes by keyword so similarity is predictable.
    struct KeywordEmbedder;

    #[async_trait]
    impl EmbeddingProvider for KeywordEmbedder {
        fn model_name(&self) -> &str {
            "keyword"
        }
        fn dims(&self) -> usize {
            2
        }
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|t| {
                    let t = t.to_lowercase();
                    vec![
                        if t.contains("rust") { 1.0 } else { 0.0 },
                        if t.contains("python") { 1.0 } else { 0.0 },
                    ]
                })
                .collect())
        }
    }

    #[derive(Default)]
    struct RecordingChat {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ChatModel for RecordingChat {
        fn model_name(&self) -> &str {
            "recording"
        }
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok("generated answer".to_string())
        }
    }

    fn chunk(id: &str, text: &str) -> Chunk {
        Chunk {
            id: id.to_string(),
            document_id: "doc".to_string(),
            chunk_index: 0,
            text: text.to_string(),
            hash: String::new(),
            metadata: ChunkMetadata {
                filename: "notes.md".to_string(),
                source: "uploads/doc.md".to_string(),
                file_type: ".md".to_string(),
                document_id: "doc".to_string(),
            },
        }
    }

    async fn seeded_store() -> Arc<InMemoryStore> {
        let store = Arc::new(InMemoryStore::new());
        let chunks = vec![
            chunk("c1", "Rust has ownership"),
            chunk("c2", "Python has a GIL"),
        ];
        let vectors = KeywordEmbedder
            .embed(&chunks.iter().map(|c| c.text.clone()).collect::<Vec<_>>())
            .await
            .unwrap();
        store.add_chunks(&chunks, &vectors).await.unwrap();
        store
    }

    #[test]
    fn test_validate_query() {
        assert_eq!(validate_query("  ", 4), Err(QueryError::EmptyQuery));
        assert_eq!(
            validate_query("q", 0),
            Err(QueryError::KOutOfRange { k: 0, max: MAX_K })
        );
        assert_eq!(
            validate_query("q", 11),
            Err(QueryError::KOutOfRange { k: 11, max: MAX_K })
        );
        assert!(validate_query("q", 1).is_ok());
        assert!(validate_query("q", MAX_K).is_ok());
    }

    #[tokio::test]
    async fn test_answer_without_chat_model_falls_back() {
        let engine = RagEngine::new(seeded_store().await, Arc::new(KeywordEmbedder), None);
        let answer = engine.answer("tell me about rust", 1).await.unwrap();
        assert!(!answer.generated);
        assert_eq!(answer.answer, FALLBACK_ANSWER);
        assert_eq!(answer.sources.len(), 1);
        assert_eq!(answer.sources[0].content, "Rust has ownership");
    }

    #[tokio::test]
    async fn test_answer_sends_template_to_model() {
        let chat = Arc::new(RecordingChat::default());
        let engine = RagEngine::new(
            seeded_store().await,
            Arc::new(KeywordEmbedder),
            Some(chat.clone()),
        );
        let answer = engine.answer("python internals?", 2).await.unwrap();

        assert!(answer.generated);
        assert_eq!(answer.answer, "generated answer");
        assert_eq!(answer.query, "python internals?");
        assert_eq!(answer.sources[0].content, "Python has a GIL");

        let prompts = chat.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Context:\nPython has a GIL\n\nRust has ownership\n"));
        assert!(prompts[0].contains("Question: python internals?"));
    }

    #[tokio::test]
    async fn test_empty_question_rejected_before_search() {
        let engine = RagEngine::new(seeded_store().await, Arc::new(KeywordEmbedder), None);
        let err = engine.answer("", 4).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<QueryError>(),
            Some(&QueryError::EmptyQuery)
        );
    }
}
