//! # docqa core
//!
//! Shared logic for docqa: data models, language-aware recursive text
//! splitting, the vector store and embedding traits, the prompt template,
//! and the retrieval-augmented answer engine.
//!
//! This crate performs no file, network, or database I/O. Concrete
//! embedding providers, the SQLite vector store, and the hosted chat model
//! live in the `docqa` application crate.

pub mod chunk;
pub mod embedding;
pub mod language;
pub mod llm;
pub mod models;
pub mod prompt;
pub mod rag;
pub mod splitter;
pub mod store;
