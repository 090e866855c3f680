//! File validation, decoding and chunking.
//!
//! [`DocumentProcessor`] turns a stored upload into [`Chunk`]s with the
//! splitter matching its extension.

use anyhow::{Context, Result};
use std::path::Path;

use docqa_core::chunk::chunk_document;
use docqa_core::language::{allowed_extensions, Language};
use docqa_core::models::{Chunk, ChunkMetadata};
use docqa_core::splitter::RecursiveSplitter;

use crate::config::Config;
use crate::error::ValidationError;

pub struct DocumentProcessor {
    chunk_size: usize,
    chunk_overlap: usize,
    max_file_size: u64,
}

/// Lower-cased extension with its leading dot, or `""` when there is none.
pub fn file_extension(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

/// Decode `bytes` as UTF-8, falling back to Latin-1.
pub fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            tracing::debug!("file is not valid UTF-8, decoding as Latin-1");
            err.into_bytes().iter().map(|&b| b as char).collect()
        }
    }
}

pub fn read_file(path: &Path) -> Result<String> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(decode_text(bytes))
}

impl DocumentProcessor {
    pub fn new(chunk_size: usize, chunk_overlap: usize, max_file_size: u64) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            max_file_size,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.chunking.chunk_size,
            config.chunking.chunk_overlap,
            config.storage.max_file_size,
        )
    }

    /// Check name and size. Returns the language the file will be split as.
    pub fn validate_file(&self, filename: &str, size: u64) -> Result<Language, ValidationError> {
        if filename.trim().is_empty() {
            return Err(ValidationError::MissingFilename);
        }

        let ext = file_extension(filename);
        let language =
            Language::from_extension(&ext).ok_or_else(|| ValidationError::UnsupportedFileType {
                ext: if ext.is_empty() { "(none)".to_string() } else { ext.clone() },
                allowed: allowed_extensions().join(", "),
            })?;

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max_mb: self.max_file_size as f64 / (1024.0 * 1024.0),
            });
        }

        Ok(language)
    }

    pub fn splitter_for(&self, language: Language) -> Result<RecursiveSplitter> {
        Ok(RecursiveSplitter::for_language(
            language,
            self.chunk_size,
            self.chunk_overlap,
        )?)
    }

    /// Read the stored copy at `path` and chunk it.
    ///
    /// `filename` is the original upload name; it picks the splitter and is
    /// recorded in every chunk's metadata together with `path`.
    pub fn process_file(
        &self,
        path: &Path,
        filename: &str,
        document_id: &str,
    ) -> Result<Vec<Chunk>> {
        let file_type = file_extension(filename);
        let language = Language::from_extension(&file_type).ok_or_else(|| {
            ValidationError::UnsupportedFileType {
                ext: file_type.clone(),
                allowed: allowed_extensions().join(", "),
            }
        })?;

        let text = read_file(path)?;
        let splitter = self.splitter_for(language)?;
        let metadata = ChunkMetadata {
            filename: filename.to_string(),
            source: path.display().to_string(),
            file_type,
            document_id: document_id.to_string(),
        };

        let chunks = chunk_document(document_id, &text, &metadata, &splitter);
        tracing::debug!(
            filename,
            ?language,
            chunks = chunks.len(),
            "processed document"
        );
        Ok(chunks)
    }
}
