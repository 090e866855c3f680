//! Gemini chat client.
//!
//! Sends the filled prompt as a single user turn to
//! `POST {base_url}/models/{model}:generateContent` and returns the text of
//! the first candidate. Transient failures (429, 5xx, network) are retried
//! with the same exponential backoff the embedding client uses.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use docqa_core::llm::ChatModel;

use crate::config::LlmConfig;
use crate::error::LlmError;

pub struct GeminiClient {
    model: String,
    base_url: String,
    api_key: String,
    temperature: f32,
    max_retries: u32,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: &LlmConfig, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            temperature: config.temperature,
            max_retries: config.max_retries,
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

/// Build the chat model described by `[llm]`.
///
/// Returns `None` when the provider is disabled or the API key variable is
/// unset; queries then fall back to returning context only.
pub fn create_chat_model(config: &LlmConfig) -> Result<Option<Arc<dyn ChatModel>>> {
    if !config.is_enabled() {
        tracing::debug!("llm provider disabled");
        return Ok(None);
    }
    match config.api_key() {
        Some(key) => Ok(Some(Arc::new(GeminiClient::new(config, key)?))),
        None => {
            tracing::warn!(
                "{}",
                LlmError::MissingApiKey(config.api_key_env.clone())
            );
            Ok(None)
        }
    }
}

pub fn request_body(prompt: &str, temperature: f32) -> serde_json::Value {
    serde_json::json!({
        "contents": [
            { "role": "user", "parts": [ { "text": prompt } ] }
        ],
        "generationConfig": { "temperature": temperature },
    })
}

/// Concatenate the `text` parts of the first candidate.
pub fn parse_gemini_response(json: &serde_json::Value) -> Result<String, LlmError> {
    let parts = json
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .ok_or(LlmError::EmptyResponse)?;

    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect();

    if text.is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok(text)
}

#[async_trait]
impl ChatModel for GeminiClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = request_body(prompt, self.temperature);
        let mut last_err: Option<LlmError> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tracing::debug!(attempt, ?delay, "retrying LLM request");
                tokio::time::sleep(delay).await;
            }

            let resp = self
                .client
                .post(self.endpoint())
                .header("x-goog-api-key", &self.api_key)
                .json(&body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let json: serde_json::Value =
                            response.json().await.map_err(LlmError::from)?;
                        return Ok(parse_gemini_response(&json)?);
                    }

                    let body_text = response.text().await.unwrap_or_default();
                    let err = LlmError::Api {
                        status: status.as_u16(),
                        body: body_text,
                    };
                    if status.as_u16() == 429 || status.is_server_error() {
                        tracing::warn!(%status, "LLM request failed, will retry");
                        last_err = Some(err);
                        continue;
                    }
                    return Err(err.into());
                }
                Err(e) => {
                    tracing::warn!(error = %e, "LLM request failed, will retry");
                    last_err = Some(LlmError::Http(e));
                    continue;
                }
            }
        }

        Err(match last_err {
            Some(err) => err.into(),
            None => anyhow::anyhow!("LLM request failed after retries"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::CannedServer;

    #[test]
    fn test_request_body_shape() {
        let body = request_body("hello", 0.0);
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(body["generationConfig"]["temperature"], 0.0);
    }

    #[test]
    fn test_parse_joins_text_parts() {
        let json = serde_json::json!({
            "candidates": [
                { "content": { "parts": [ { "text": "Hello, " }, { "text": "world" } ] } },
                { "content": { "parts": [ { "text": "ignored" } ] } }
            ]
        });
        assert_eq!(parse_gemini_response(&json).unwrap(), "Hello, world");
    }

    #[test]
    fn test_parse_empty_is_error() {
        assert!(matches!(
            parse_gemini_response(&serde_json::json!({ "candidates": [] })),
            Err(LlmError::EmptyResponse)
        ));
        let no_text = serde_json::json!({
            "candidates": [ { "content": { "parts": [ { "inlineData": {} } ] } } ]
        });
        assert!(matches!(
            parse_gemini_response(&no_text),
            Err(LlmError::EmptyResponse)
        ));
    }

    #[test]
    fn test_endpoint() {
        let config = LlmConfig {
            base_url: "https://example.test/v1beta/".to_string(),
            ..LlmConfig::default()
        };
        let client = GeminiClient::new(&config, "key".to_string()).unwrap();
        assert_eq!(
            client.endpoint(),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_disabled_or_keyless_gives_no_model() {
        let disabled = LlmConfig {
            provider: "disabled".to_string(),
            ..LlmConfig::default()
        };
        assert!(create_chat_model(&disabled).unwrap().is_none());

        let keyless = LlmConfig {
            api_key_env: "DOCQA_TEST_UNSET_GEMINI_KEY".to_string(),
            ..LlmConfig::default()
        };
        assert!(create_chat_model(&keyless).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_http_error() {
        let config = LlmConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            max_retries: 0,
            timeout_secs: 2,
            ..LlmConfig::default()
        };
        let client = GeminiClient::new(&config, "key".to_string()).unwrap();
        let err = client.generate("hi").await.unwrap_err();
        assert!(matches!(err.downcast_ref::<LlmError>(), Some(LlmError::Http(_))));
    }

    fn client_for(url: &str, max_retries: u32) -> GeminiClient {
        let config = LlmConfig {
            base_url: url.to_string(),
            max_retries,
            timeout_secs: 5,
            ..LlmConfig::default()
        };
        GeminiClient::new(&config, "key".to_string()).unwrap()
    }

    const HI: &str = r#"{"candidates":[{"content":{"parts":[{"text":"hi"}]}}]}"#;

    #[tokio::test]
    async fn test_retries_rate_limit_and_server_errors() {
        let server = CannedServer::start(vec![(429, "{}"), (503, "{}"), (200, HI)]).await;
        let client = client_for(&server.url, 2);
        assert_eq!(client.generate("hello").await.unwrap(), "hi");
        assert_eq!(server.requests(), 3);
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let server = CannedServer::start(vec![(400, "bad"), (200, HI)]).await;
        let client = client_for(&server.url, 3);
        let err = client.generate("hello").await.unwrap_err();
        match err.downcast_ref::<LlmError>() {
            Some(LlmError::Api { status, body }) => {
                assert_eq!(*status, 400);
                assert_eq!(body, "bad");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(server.requests(), 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let server = CannedServer::start(vec![(500, "down"), (500, "down"), (200, HI)]).await;
        let client = client_for(&server.url, 1);
        let err = client.generate("hello").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LlmError>(),
            Some(LlmError::Api { status: 500, .. })
        ));
        assert_eq!(server.requests(), 2);
    }
}
