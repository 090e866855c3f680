//! Concrete embedding providers.
//!
//! - **`LocalProvider`**: runs a sentence-transformer model in-process via
//!   fastembed (feature `local-embeddings-fastembed`, on by default). The
//!   model is downloaded once, loaded on first use and kept for the life of
//!   the process.
//! - **[`OllamaProvider`]**: calls a running Ollama instance's `/api/embed`.
//!
//! Every vector leaving a provider is L2-normalised, so cosine similarity
//! and dot product agree.
//!
//! # Retry Strategy
//!
//! The Ollama provider retries transient failures with exponential backoff:
//! - HTTP 429 and 5xx → retry
//! - other 4xx → fail immediately
//! - network errors → retry
//! - backoff: 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5)

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use docqa_core::embedding::{normalize, EmbeddingProvider};

use crate::config::EmbeddingConfig;

pub const DEFAULT_LOCAL_MODEL: &str = "all-minilm-l6-v2";
const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Build the provider named by `embedding.provider`.
///
/// | Config Value | Provider |
/// |-------------|----------|
/// | `"local"` | `LocalProvider` (fastembed) |
/// | `"ollama"` | [`OllamaProvider`] |
pub fn create_provider(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "ollama" => Ok(Arc::new(OllamaProvider::new(config)?)),
        #[cfg(feature = "local-embeddings-fastembed")]
        "local" => Ok(Arc::new(LocalProvider::new(config)?)),
        #[cfg(not(feature = "local-embeddings-fastembed"))]
        "local" => bail!("Local embedding provider requires --features local-embeddings-fastembed"),
        other => bail!("Unknown embedding provider: {}", other),
    }
}

/// Model name and dimensionality for the local provider.
pub fn resolve_local_model(config: &EmbeddingConfig) -> (String, usize) {
    let model_name = config
        .model
        .clone()
        .unwrap_or_else(|| DEFAULT_LOCAL_MODEL.to_string());

    let dims = config.dims.unwrap_or(match model_name.as_str() {
        "all-minilm-l6-v2" => 384,
        "all-minilm-l12-v2" => 384,
        "bge-small-en-v1.5" => 384,
        "bge-base-en-v1.5" => 768,
        "bge-large-en-v1.5" => 1024,
        "nomic-embed-text-v1.5" => 768,
        _ => 384,
    });

    (model_name, dims)
}

fn normalize_all(mut vectors: Vec<Vec<f32>>) -> Vec<Vec<f32>> {
    for v in vectors.iter_mut() {
        normalize(v);
    }
    vectors
}

// ============ Local Provider (fastembed) ============

#[cfg(feature = "local-embeddings-fastembed")]
pub use local::LocalProvider;

#[cfg(feature = "local-embeddings-fastembed")]
mod local {
    use super::*;
    use std::sync::Mutex;

    /// In-process embedding with fastembed's bundled ONNX runtime.
    pub struct LocalProvider {
        model_name: String,
        dims: usize,
        batch_size: usize,
        model: Arc<Mutex<Option<fastembed::TextEmbedding>>>,
    }

    impl LocalProvider {
        pub fn new(config: &EmbeddingConfig) -> Result<Self> {
            let (model_name, dims) = resolve_local_model(config);
            // Fail on an unknown name now rather than at first upload.
            config_to_fastembed_model(&model_name)?;
            Ok(Self {
                model_name,
                dims,
                batch_size: config.batch_size,
                model: Arc::new(Mutex::new(None)),
            })
        }
    }

    fn config_to_fastembed_model(name: &str) -> Result<fastembed::EmbeddingModel> {
        match name {
            "all-minilm-l6-v2" => Ok(fastembed::EmbeddingModel::AllMiniLML6V2),
            "all-minilm-l12-v2" => Ok(fastembed::EmbeddingModel::AllMiniLML12V2),
            "bge-small-en-v1.5" => Ok(fastembed::EmbeddingModel::BGESmallENV15),
            "bge-base-en-v1.5" => Ok(fastembed::EmbeddingModel::BGEBaseENV15),
            "bge-large-en-v1.5" => Ok(fastembed::EmbeddingModel::BGELargeENV15),
            "nomic-embed-text-v1.5" => Ok(fastembed::EmbeddingModel::NomicEmbedTextV15),
            other => bail!(
                "Unknown local embedding model: '{}'. Supported models: \
                 all-minilm-l6-v2, all-minilm-l12-v2, bge-small-en-v1.5, \
                 bge-base-en-v1.5, bge-large-en-v1.5, nomic-embed-text-v1.5",
                other
            ),
        }
    }

    #[async_trait]
    impl EmbeddingProvider for LocalProvider {
        fn model_name(&self) -> &str {
            &self.model_name
        }

        fn dims(&self) -> usize {
            self.dims
        }

        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            if texts.is_empty() {
                return Ok(Vec::new());
            }

            let model_slot = Arc::clone(&self.model);
            let model_name = self.model_name.clone();
            let batch_size = self.batch_size;
            let texts = texts.to_vec();

            let vectors = tokio::task::spawn_blocking(move || -> Result<Vec<Vec<f32>>> {
                let mut slot = model_slot
                    .lock()
                    .map_err(|_| anyhow::anyhow!("embedding model lock poisoned"))?;

                if slot.is_none() {
                    tracing::info!(model = %model_name, "loading local embedding model");
                    let model = fastembed::TextEmbedding::try_new(
                        fastembed::InitOptions::new(config_to_fastembed_model(&model_name)?)
                            .with_show_download_progress(true),
                    )
                    .map_err(|e| {
                        anyhow::anyhow!("Failed to initialize local embedding model: {}", e)
                    })?;
                    *slot = Some(model);
                }

                let model = slot
                    .as_mut()
                    .ok_or_else(|| anyhow::anyhow!("embedding model not loaded"))?;
                model
                    .embed(texts, Some(batch_size))
                    .map_err(|e| anyhow::anyhow!("Local embedding failed: {}", e))
            })
            .await??;

            Ok(normalize_all(vectors))
        }
    }
}

// ============ Ollama Provider ============

/// Embedding provider using a local Ollama instance.
///
/// Calls `POST {url}/api/embed` (default `http://localhost:11434`). Requires
/// an embedding model pulled into Ollama (e.g. `ollama pull nomic-embed-text`).
pub struct OllamaProvider {
    model: String,
    dims: usize,
    url: String,
    batch_size: usize,
    max_retries: u32,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let model = config
            .model
            .clone()
            .ok_or_else(|| anyhow::anyhow!("embedding.model required for Ollama provider"))?;
        let dims = config
            .dims
            .ok_or_else(|| anyhow::anyhow!("embedding.dims required for Ollama provider"))?;
        let url = config
            .url
            .clone()
            .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            model,
            dims,
            url,
            batch_size: config.batch_size,
            max_retries: config.max_retries,
            client,
        })
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let body = serde_json::json!({
            "model": self.model,
            "input": texts,
        });

        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tracing::debug!(attempt, ?delay, "retrying Ollama embedding request");
                tokio::time::sleep(delay).await;
            }

            let resp = self
                .client
                .post(format!("{}/api/embed", self.url))
                .json(&body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let json: serde_json::Value = response.json().await?;
                        return parse_ollama_response(&json, texts.len());
                    }

                    let body_text = response.text().await.unwrap_or_default();
                    if status.as_u16() == 429 || status.is_server_error() {
                        last_err = Some(anyhow::anyhow!(
                            "Ollama API error {}: {}",
                            status,
                            body_text
                        ));
                        continue;
                    }

                    bail!("Ollama API error {}: {}", status, body_text);
                }
                Err(e) => {
                    last_err = Some(anyhow::anyhow!(
                        "Ollama connection error (is Ollama running at {}?): {}",
                        self.url,
                        e
                    ));
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow::anyhow!("Ollama embedding failed after retries")))
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size.max(1)) {
            out.extend(self.embed_batch(batch).await?);
        }
        Ok(normalize_all(out))
    }
}

fn parse_ollama_response(json: &serde_json::Value, expected: usize) -> Result<Vec<Vec<f32>>> {
    let embeddings = json
        .get("embeddings")
        .and_then(|e| e.as_array())
        .ok_or_else(|| anyhow::anyhow!("Invalid Ollama response: missing embeddings array"))?;

    if embeddings.len() != expected {
        bail!(
            "Invalid Ollama response: {} embeddings for {} inputs",
            embeddings.len(),
            expected
        );
    }

    let mut result = Vec::with_capacity(embeddings.len());
    for embedding in embeddings {
        let vec: Vec<f32> = embedding
            .as_array()
            .ok_or_else(|| anyhow::anyhow!("Invalid Ollama response: embedding is not an array"))?
            .iter()
            .map(|v| v.as_f64().unwrap_or(0.0) as f32)
            .collect();
        result.push(vec);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::CannedServer;

    fn ollama_config() -> EmbeddingConfig {
        EmbeddingConfig {
            provider: "ollama".to_string(),
            model: Some("nomic-embed-text".to_string()),
            dims: Some(768),
            url: Some("http://127.0.0.1:9/".to_string()),
            max_retries: 0,
            timeout_secs: 2,
            ..EmbeddingConfig::default()
        }
    }

    #[test]
    fn test_parse_ollama_response() {
        let json = serde_json::json!({ "embeddings": [[0.1, 0.2], [0.3, 0.4]] });
        let vecs = parse_ollama_response(&json, 2).unwrap();
        assert_eq!(vecs.len(), 2);
        assert!((vecs[1][0] - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_parse_ollama_response_count_mismatch() {
        let json = serde_json::json!({ "embeddings": [[0.1, 0.2]] });
        assert!(parse_ollama_response(&json, 2).is_err());
        assert!(parse_ollama_response(&serde_json::json!({}), 0).is_err());
    }

    #[test]
    fn test_resolve_local_model_defaults() {
        let (name, dims) = resolve_local_model(&EmbeddingConfig::default());
        assert_eq!(name, "all-minilm-l6-v2");
        assert_eq!(dims, 384);

        let cfg = EmbeddingConfig {
            model: Some("bge-base-en-v1.5".to_string()),
            ..EmbeddingConfig::default()
        };
        assert_eq!(resolve_local_model(&cfg).1, 768);
    }

    #[test]
    fn test_ollama_provider_trims_url() {
        let provider = OllamaProvider::new(&ollama_config()).unwrap();
        assert_eq!(provider.url, "http://127.0.0.1:9");
        assert_eq!(provider.model_name(), "nomic-embed-text");
        assert_eq!(provider.dims(), 768);
    }

    #[tokio::test]
    async fn test_ollama_unreachable_fails_without_retry() {
        let provider = OllamaProvider::new(&ollama_config()).unwrap();
        let err = provider.embed(&["hello".to_string()]).await.unwrap_err();
        assert!(err.to_string().contains("Ollama connection error"));
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let cfg = EmbeddingConfig {
            provider: "openai".to_string(),
            ..EmbeddingConfig::default()
        };
        assert!(create_provider(&cfg).is_err());
    }

    fn ollama_at(url: &str, max_retries: u32) -> OllamaProvider {
        OllamaProvider::new(&EmbeddingConfig {
            url: Some(url.to_string()),
            max_retries,
            timeout_secs: 5,
            ..ollama_config()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_ollama_retries_server_error() {
        let server =
            CannedServer::start(vec![(503, "busy"), (200, r#"{"embeddings":[[3.0,4.0]]}"#)]).await;
        let provider = ollama_at(&server.url, 2);
        let vecs = provider.embed(&["hello".to_string()]).await.unwrap();
        assert_eq!(server.requests(), 2);
        assert!((vecs[0][0] - 0.6).abs() < 1e-6);
        assert!((vecs[0][1] - 0.8).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_ollama_client_error_fails_fast() {
        let server = CannedServer::start(vec![
            (400, r#"{"error":"model not found"}"#),
            (200, r#"{"embeddings":[[1.0]]}"#),
        ])
        .await;
        let provider = ollama_at(&server.url, 3);
        let err = provider.embed(&["hello".to_string()]).await.unwrap_err();
        assert!(err.to_string().starts_with("Ollama API error 400"));
        assert!(err.to_string().contains("model not found"));
        assert_eq!(server.requests(), 1);
    }
}
