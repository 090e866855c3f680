//! Upload pipeline.
//!
//! ```text
//! validate ─▶ copy to {upload_dir}/{document_id}{ext} ─▶ chunk ─▶ embed
//!          ─▶ store vectors ─▶ record document row ─▶ UploadReport
//! ```
//!
//! Validation failures write nothing. A failed copy removes whatever part
//! of the stored copy was written; any later failure also removes the
//! vectors already written.

use anyhow::{Context, Result};
use serde::Serialize;
use sqlx::SqlitePool;
use std::path::Path;
use uuid::Uuid;

use docqa_core::embedding::EmbeddingProvider;
use docqa_core::store::VectorStore;

use crate::config::Config;
use crate::db;
use crate::embedding::create_provider;
use crate::error::ValidationError;
use crate::history::{record_document, NewDocument};
use crate::processor::{file_extension, DocumentProcessor};
use crate::sqlite_store::SqliteStore;

#[derive(Debug, Clone, Serialize)]
pub struct UploadReport {
    pub status: String,
    pub filename: String,
    pub document_id: String,
    pub chunks_created: usize,
    pub message: String,
}

impl UploadReport {
    fn success(filename: String, document_id: String, chunks_created: usize) -> Self {
        Self {
            status: "success".to_string(),
            message: format!(
                "File uploaded and processed successfully. Created {} chunks.",
                chunks_created
            ),
            filename,
            document_id,
            chunks_created,
        }
    }
}

pub struct Uploader<'a> {
    pub processor: &'a DocumentProcessor,
    pub upload_dir: &'a Path,
    pub pool: &'a SqlitePool,
    pub store: &'a dyn VectorStore,
    pub embedder: &'a dyn EmbeddingProvider,
}

impl Uploader<'_> {
    /// Run the full pipeline for the file at `source`.
    pub async fn ingest_file(&self, source: &Path) -> Result<UploadReport> {
        let filename = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or(ValidationError::MissingFilename)?;
        let size = std::fs::metadata(source)
            .with_context(|| format!("Failed to read {}", source.display()))?
            .len();

        self.processor.validate_file(&filename, size)?;

        let document_id = Uuid::new_v4().to_string();
        let file_type = file_extension(&filename);
        std::fs::create_dir_all(self.upload_dir).with_context(|| {
            format!(
                "Failed to create upload directory: {}",
                self.upload_dir.display()
            )
        })?;
        let stored = self
            .upload_dir
            .join(format!("{}{}", document_id, file_type));
        if let Err(e) = std::fs::copy(source, &stored) {
            // A partial copy may exist.
            let _ = std::fs::remove_file(&stored);
            return Err(e).with_context(|| format!("Failed to store {}", stored.display()));
        }

        match self
            .index_stored(&stored, &filename, &document_id, &file_type, size)
            .await
        {
            Ok(chunks_created) => {
                tracing::info!(%document_id, filename = %filename, chunks_created, "upload complete");
                Ok(UploadReport::success(filename, document_id, chunks_created))
            }
            Err(e) => {
                tracing::warn!(%document_id, error = %e, "upload failed, cleaning up");
                self.cleanup(&stored, &document_id).await;
                Err(e)
            }
        }
    }

    async fn index_stored(
        &self,
        stored: &Path,
        filename: &str,
        document_id: &str,
        file_type: &str,
        size: u64,
    ) -> Result<usize> {
        let chunks = self.processor.process_file(stored, filename, document_id)?;

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self
            .embedder
            .embed(&texts)
            .await
            .context("Failed to embed document chunks")?;
        self.store.add_chunks(&chunks, &vectors).await?;

        let stored_path = stored.display().to_string();
        record_document(
            self.pool,
            &NewDocument {
                document_id,
                filename,
                file_type,
                stored_path: &stored_path,
                file_size: size,
                chunks_created: chunks.len(),
            },
        )
        .await?;

        Ok(chunks.len())
    }

    async fn cleanup(&self, stored: &Path, document_id: &str) {
        if let Err(e) = std::fs::remove_file(stored) {
            tracing::warn!(path = %stored.display(), error = %e, "failed to remove stored copy");
        }
        if let Err(e) = self.store.delete_document(document_id).await {
            tracing::warn!(%document_id, error = %e, "failed to remove partial vectors");
        }
    }
}

pub async fn run_upload(config: &Config, file: &Path) -> Result<()> {
    let pool = db::connect(config).await?;
    let embedder = create_provider(&config.embedding)?;
    let store = SqliteStore::new(pool.clone(), embedder.model_name());
    let processor = DocumentProcessor::from_config(config);

    let uploader = Uploader {
        processor: &processor,
        upload_dir: &config.storage.upload_dir,
        pool: &pool,
        store: &store,
        embedder: embedder.as_ref(),
    };
    let result = uploader.ingest_file(file).await;
    pool.close().await;
    let report = result?;

    println!("{}", report.message);
    println!("  filename:    {}", report.filename);
    println!("  document_id: {}", report.document_id);
    Ok(())
}
