//! Core data models that flow through the upload and query pipeline.

use serde::{Deserialize, Serialize};

/// Provenance attached to every chunk of an uploaded file.
///
/// Serialized verbatim into the `sources` of a query answer, so the field
/// names are part of the JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Original file name as uploaded.
    pub filename: String,
    /// Path of the stored copy the chunk was read from.
    pub source: String,
    /// Lower-cased extension including the dot (e.g. `.py`).
    pub file_type: String,
    /// UUID of the uploaded document.
    pub document_id: String,
}

/// A chunk of a document's text, ready to be embedded.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub id: String,
    pub document_id: String,
    pub chunk_index: i64,
    pub text: String,
    /// SHA-256 of `text`, hex encoded.
    pub hash: String,
    pub metadata: ChunkMetadata,
}

/// A chunk returned by nearest-neighbour search.
#[derive(Debug, Clone, Serialize)]
pub struct RetrievedChunk {
    pub chunk_id: String,
    pub document_id: String,
    pub content: String,
    pub metadata: ChunkMetadata,
    /// Cosine similarity to the query vector.
    pub score: f64,
}

/// Source entry of a query answer: the chunk text and its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub content: String,
    pub metadata: ChunkMetadata,
}

impl From<&RetrievedChunk> for Source {
    fn from(chunk: &RetrievedChunk) -> Self {
        Self {
            content: chunk.content.clone(),
            metadata: chunk.metadata.clone(),
        }
    }
}

/// Answer produced by the RAG engine.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub query: String,
    pub answer: String,
    pub sources: Vec<Source>,
    /// `false` when no chat model was configured and the answer is the
    /// context-only fallback message.
    #[serde(skip)]
    pub generated: bool,
}
