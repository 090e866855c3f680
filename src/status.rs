//! Health summary and collection reset.
//!
//! `docqa status` reports what is stored and which backends are configured;
//! `docqa reset` empties the vector collection while keeping upload and
//! query history.

use anyhow::Result;
use serde::Serialize;
use sqlx::SqlitePool;

use docqa_core::store::VectorStore;

use crate::config::Config;
use crate::db;
use crate::embedding::resolve_local_model;
use crate::sqlite_store::SqliteStore;

#[derive(Debug, Clone, Serialize)]
pub struct Status {
    pub app: String,
    pub version: String,
    pub database: String,
    pub documents: i64,
    pub chunks: i64,
    pub vectors: i64,
    pub queries: i64,
    pub embedding_provider: String,
    pub embedding_model: String,
    pub llm_model: Option<String>,
}

fn embedding_model_name(config: &Config) -> String {
    match config.embedding.provider.as_str() {
        "local" => resolve_local_model(&config.embedding).0,
        _ => config.embedding.model.clone().unwrap_or_default(),
    }
}

pub async fn collect_status(config: &Config, pool: &SqlitePool) -> Result<Status> {
    let store = SqliteStore::new(pool.clone(), "");

    let documents: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents")
        .fetch_one(pool)
        .await?;
    let queries: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM query_history")
        .fetch_one(pool)
        .await?;

    let llm_model = if config.llm.is_enabled() && config.llm.api_key().is_some() {
        Some(config.llm.model.clone())
    } else {
        None
    };

    Ok(Status {
        app: config.app.name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: config.db.path.display().to_string(),
        documents,
        chunks: store.chunk_count().await?,
        vectors: store.count().await?,
        queries,
        embedding_provider: config.embedding.provider.clone(),
        embedding_model: embedding_model_name(config),
        llm_model,
    })
}

pub async fn run_status(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    let status = collect_status(config, &pool).await;
    pool.close().await;
    let status = status?;

    println!("{} v{}: healthy", status.app, status.version);
    println!();
    println!("  Database:    {}", status.database);
    println!("  Documents:   {}", status.documents);
    println!("  Chunks:      {}", status.chunks);
    println!("  Vectors:     {}", status.vectors);
    println!("  Queries:     {}", status.queries);
    println!(
        "  Embedding:   {} ({})",
        status.embedding_provider, status.embedding_model
    );
    match &status.llm_model {
        Some(model) => println!("  LLM:         {}", model),
        None => println!(
            "  LLM:         not configured (set {} for generated answers)",
            config.llm.api_key_env
        ),
    }
    Ok(())
}

pub async fn run_reset(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool.clone(), "");
    let before = store.count().await?;
    let result = store.clear().await;
    pool.close().await;
    result?;

    tracing::info!(vectors = before, "vector collection cleared");
    println!("Vector store reset successfully ({} vectors removed).", before);
    Ok(())
}
