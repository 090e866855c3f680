//! Upload and query history.
//!
//! Document rows record what was uploaded and where its stored copy lives;
//! query rows keep every answered question with the sources it cited. Both
//! are listed newest first.

use anyhow::{Context, Result};
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use std::path::Path;

use docqa_core::models::{Answer, Source};
use docqa_core::store::VectorStore;

use crate::config::Config;
use crate::db;
use crate::sqlite_store::SqliteStore;

/// Default number of queries shown by `docqa history`.
pub const DEFAULT_HISTORY_LIMIT: u32 = 50;

#[derive(Debug, Clone, Serialize)]
pub struct DocumentRecord {
    pub id: i64,
    pub document_id: String,
    pub filename: String,
    pub file_type: String,
    pub stored_path: String,
    pub file_size: i64,
    pub chunks_created: i64,
    pub uploaded_at: i64,
}

/// Fields of a document row before it is inserted.
#[derive(Debug, Clone)]
pub struct NewDocument<'a> {
    pub document_id: &'a str,
    pub filename: &'a str,
    pub file_type: &'a str,
    pub stored_path: &'a str,
    pub file_size: u64,
    pub chunks_created: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryRecord {
    pub id: i64,
    pub query: String,
    pub answer: String,
    pub sources: Vec<Source>,
    pub k: i64,
    pub created_at: i64,
}

pub async fn record_document(pool: &SqlitePool, doc: &NewDocument<'_>) -> Result<i64> {
    let now = chrono::Utc::now().timestamp();
    let result = sqlx::query(
        r#"
        INSERT INTO documents (document_id, filename, file_type, stored_path,
                               file_size, chunks_created, uploaded_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(doc.document_id)
    .bind(doc.filename)
    .bind(doc.file_type)
    .bind(doc.stored_path)
    .bind(doc.file_size as i64)
    .bind(doc.chunks_created as i64)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

fn document_from_row(row: &sqlx::sqlite::SqliteRow) -> DocumentRecord {
    DocumentRecord {
        id: row.get("id"),
        document_id: row.get("document_id"),
        filename: row.get("filename"),
        file_type: row.get("file_type"),
        stored_path: row.get("stored_path"),
        file_size: row.get("file_size"),
        chunks_created: row.get("chunks_created"),
        uploaded_at: row.get("uploaded_at"),
    }
}

pub async fn list_documents(pool: &SqlitePool) -> Result<Vec<DocumentRecord>> {
    let rows = sqlx::query("SELECT * FROM documents ORDER BY uploaded_at DESC, id DESC")
        .fetch_all(pool)
        .await?;
    Ok(rows.iter().map(document_from_row).collect())
}

pub async fn get_document(pool: &SqlitePool, document_id: &str) -> Result<Option<DocumentRecord>> {
    let row = sqlx::query("SELECT * FROM documents WHERE document_id = ?")
        .bind(document_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.as_ref().map(document_from_row))
}

pub async fn record_query(pool: &SqlitePool, answer: &Answer, k: usize) -> Result<i64> {
    let now = chrono::Utc::now().timestamp();
    let sources_json = serde_json::to_string(&answer.sources)?;
    let result = sqlx::query(
        "INSERT INTO query_history (query, answer, sources_json, k, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&answer.query)
    .bind(&answer.answer)
    .bind(&sources_json)
    .bind(k as i64)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn list_queries(pool: &SqlitePool, limit: u32) -> Result<Vec<QueryRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT id, query, answer, sources_json, k, created_at
        FROM query_history
        ORDER BY created_at DESC, id DESC
        LIMIT ?
        "#,
    )
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await?;

    let mut records = Vec::with_capacity(rows.len());
    for row in &rows {
        let id: i64 = row.get("id");
        let sources_json: String = row.get("sources_json");
        let sources: Vec<Source> = serde_json::from_str(&sources_json)
            .with_context(|| format!("Corrupt sources for query {}", id))?;
        records.push(QueryRecord {
            id,
            query: row.get("query"),
            answer: row.get("answer"),
            sources,
            k: row.get("k"),
            created_at: row.get("created_at"),
        });
    }
    Ok(records)
}

/// Remove a document: its vectors, chunks, row and stored copy.
///
/// Returns `false` when no such document was recorded.
pub async fn delete_document(
    pool: &SqlitePool,
    store: &dyn VectorStore,
    document_id: &str,
) -> Result<bool> {
    let record = match get_document(pool, document_id).await? {
        Some(r) => r,
        None => return Ok(false),
    };

    let removed = store.delete_document(document_id).await?;
    sqlx::query("DELETE FROM documents WHERE document_id = ?")
        .bind(document_id)
        .execute(pool)
        .await?;

    let stored = Path::new(&record.stored_path);
    if stored.exists() {
        std::fs::remove_file(stored)
            .with_context(|| format!("Failed to remove {}", stored.display()))?;
    }

    tracing::info!(document_id, chunks = removed, "deleted document");
    Ok(true)
}

pub fn format_ts(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ts.to_string())
}

fn truncate(text: &str, max: usize) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() <= max {
        flat
    } else {
        let cut: String = flat.chars().take(max).collect();
        format!("{}...", cut)
    }
}

pub async fn run_documents(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    let docs = list_documents(&pool).await?;

    if docs.is_empty() {
        println!("No documents uploaded.");
    } else {
        println!(
            "{:<36}  {:<28} {:>8} {:>7}  UPLOADED",
            "DOCUMENT ID", "FILENAME", "SIZE", "CHUNKS"
        );
        for d in &docs {
            println!(
                "{:<36}  {:<28} {:>8} {:>7}  {}",
                d.document_id,
                truncate(&d.filename, 28),
                d.file_size,
                d.chunks_created,
                format_ts(d.uploaded_at)
            );
        }
    }

    pool.close().await;
    Ok(())
}

pub async fn run_history(config: &Config, limit: u32) -> Result<()> {
    let pool = db::connect(config).await?;
    let queries = list_queries(&pool, limit).await?;

    if queries.is_empty() {
        println!("No queries yet.");
    }
    for q in &queries {
        println!("[{}] {} (k={})", format_ts(q.created_at), q.query, q.k);
        println!("    {}", truncate(&q.answer, 100));
        println!("    sources: {}", q.sources.len());
    }

    pool.close().await;
    Ok(())
}

pub async fn run_delete(config: &Config, document_id: &str) -> Result<()> {
    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool.clone(), "");
    let deleted = delete_document(&pool, &store, document_id).await?;
    pool.close().await;

    if !deleted {
        anyhow::bail!("Document not found: {}", document_id);
    }
    println!("Deleted document {}", document_id);
    Ok(())
}
