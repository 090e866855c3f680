//! `docqa query` and `docqa search`.

use anyhow::Result;
use sqlx::SqlitePool;
use std::sync::Arc;

use docqa_core::models::Answer;
use docqa_core::rag::RagEngine;

use crate::config::Config;
use crate::db;
use crate::embedding::create_provider;
use crate::history::record_query;
use crate::llm::create_chat_model;
use crate::sqlite_store::SqliteStore;

/// Wire the SQLite store, the configured embedder and (if available) the
/// chat model into a [`RagEngine`].
pub fn build_engine(config: &Config, pool: &SqlitePool, with_chat: bool) -> Result<RagEngine> {
    let embedder = create_provider(&config.embedding)?;
    let store = Arc::new(SqliteStore::new(pool.clone(), embedder.model_name()));
    let chat = if with_chat {
        create_chat_model(&config.llm)?
    } else {
        None
    };
    Ok(RagEngine::new(store, embedder, chat))
}

/// Answer `question` and record it in the query history.
pub async fn answer_and_record(
    engine: &RagEngine,
    pool: &SqlitePool,
    question: &str,
    k: usize,
) -> Result<Answer> {
    let answer = engine.answer(question, k).await?;
    record_query(pool, &answer, k).await?;
    Ok(answer)
}

pub async fn run_query(config: &Config, question: &str, k: Option<usize>, json: bool) -> Result<()> {
    let k = k.unwrap_or(config.retrieval.k);
    docqa_core::rag::validate_query(question, k)?;

    let pool = db::connect(config).await?;
    let engine = build_engine(config, &pool, true)?;
    let result = answer_and_record(&engine, &pool, question, k).await;
    pool.close().await;
    let answer = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&answer)?);
        return Ok(());
    }

    print!("{}", render_answer(&answer));
    Ok(())
}

/// Plain-text rendering of an answer for `docqa query`.
///
/// A generated answer lists its sources by file. A context-only answer has
/// nothing else to show, so the retrieved chunks are printed in full.
pub fn render_answer(answer: &Answer) -> String {
    let mut out = format!("{}\n", answer.answer);
    if answer.sources.is_empty() {
        return out;
    }

    out.push_str(if answer.generated {
        "\nSources:\n"
    } else {
        "\nContext:\n"
    });
    for (i, source) in answer.sources.iter().enumerate() {
        out.push_str(&format!(
            "  {}. {} ({})\n",
            i + 1,
            source.metadata.filename,
            source.metadata.document_id
        ));
        if !answer.generated {
            for line in source.content.lines() {
                out.push_str(&format!("     {}\n", line));
            }
        }
    }
    out
}

/// Retrieval only: no model call, nothing recorded.
pub async fn run_search(config: &Config, question: &str, k: Option<usize>) -> Result<()> {
    let k = k.unwrap_or(config.retrieval.k);
    docqa_core::rag::validate_query(question, k)?;

    let pool = db::connect(config).await?;
    let engine = build_engine(config, &pool, false)?;
    let result = engine.retrieve(question, k).await;
    pool.close().await;
    let hits = result?;

    if hits.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, hit) in hits.iter().enumerate() {
        println!(
            "{}. [{:.3}] {} (chunk {})",
            i + 1,
            hit.score,
            hit.metadata.filename,
            hit.chunk_id
        );
        let preview: String = hit.content.chars().take(200).collect();
        for line in preview.lines() {
            println!("     {}", line);
        }
        println!();
    }
    Ok(())
}
