//! # docqa
//!
//! Upload text and source-code files, then ask natural-language questions
//! answered by a language model grounded in the uploaded content.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────────────┐   ┌──────────────┐
//! │  upload  │──▶│ split ▸ embed     │──▶│    SQLite    │
//! │  (file)  │   │ (per-language)    │   │ chunks+BLOBs │
//! └──────────┘   └───────────────────┘   └──────┬───────┘
//!                                               │ top-k cosine
//! ┌──────────┐   ┌───────────────────┐          │
//! │  query   │──▶│ prompt ▸ Gemini   │◀─────────┘
//! └──────────┘   └───────────────────┘
//! ```
//!
//! Pure pipeline logic (splitting, chunking, the store and model traits,
//! the RAG engine) lives in `docqa-core`; this crate adds configuration,
//! persistence, the concrete embedding and LLM clients, and the CLI.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Database connection |
//! | [`migrate`] | Table bootstrap |
//! | [`sqlite_store`] | SQLite vector store |
//! | [`embedding`] | Local and Ollama embedding providers |
//! | [`llm`] | Gemini chat client |
//! | [`processor`] | File validation, decoding, chunking |
//! | [`upload`] | Upload pipeline |
//! | [`query`] | Question answering and retrieval commands |
//! | [`history`] | Document and query history |
//! | [`status`] | Health summary and reset |
//! | [`error`] | Typed validation and LLM errors |

pub mod config;
pub mod db;
pub mod embedding;
pub mod error;
pub mod history;
pub mod llm;
pub mod migrate;
pub mod processor;
pub mod query;
pub mod sqlite_store;
pub mod status;
pub mod upload;

#[cfg(test)]
mod testing;
