//! Chat model trait.
//!
//! The hosted model client lives in the app crate; the engine only needs
//! "prompt in, text out".

use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Model identifier, for logs and status output.
    fn model_name(&self) -> &str;
    /// Send a single user prompt and return the model's text reply.
    async fn generate(&self, prompt: &str) -> Result<String>;
}
