//! Turns split text into [`Chunk`]s.
//!
//! Each chunk gets a fresh UUID, a contiguous index starting at 0, a copy
//! of the document's [`ChunkMetadata`], and a SHA-256 hash of its text.
//!
//! # Example
//!
//! ```rust
//! use docqa_core::chunk::chunk_document;
//! use docqa_core::models::ChunkMetadata;
//! use docqa_core::splitter::RecursiveSplitter;
//!
//! let splitter = RecursiveSplitter::plain_text(1000, 200).unwrap();
//! let meta = ChunkMetadata {
//!     filename: "notes.txt".into(),
//!     source: "uploads/doc-1.txt".into(),
//!     file_type: ".txt".into(),
//!     document_id: "doc-1".into(),
//! };
//! let chunks = chunk_document("doc-1", "Hello world.\n\nSecond paragraph.", &meta, &splitter);
//! assert_eq!(chunks.len(), 1);
//! assert_eq!(chunks[0].chunk_index, 0);
//! ```

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::models::{Chunk, ChunkMetadata};
use crate::splitter::RecursiveSplitter;

/// Split `text` and wrap every piece as a [`Chunk`] of `document_id`.
///
/// Blank documents produce no chunks.
pub fn chunk_document(
    document_id: &str,
    text: &str,
    metadata: &ChunkMetadata,
    splitter: &RecursiveSplitter,
) -> Vec<Chunk> {
    splitter
        .split_text(text)
        .into_iter()
        .enumerate()
        .map(|(i, piece)| make_chunk(document_id, i as i64, piece, metadata))
        .collect()
}

/// Hex-encoded SHA-256 of `text`.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn make_chunk(document_id: &str, index: i64, text: String, metadata: &ChunkMetadata) -> Chunk {
    Chunk {
        id: Uuid::new_v4().to_string(),
        document_id: document_id.to_string(),
        chunk_index: index,
        hash: content_hash(&text),
        text,
        metadata: metadata.clone(),
    }
}
