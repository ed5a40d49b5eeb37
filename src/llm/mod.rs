//! Text-generation client.
//!
//! The analyzer only needs one prompt in and one reply out; `TextGenerator`
//! is that seam, and `ChatClient` implements it against an
//! OpenAI-compatible `/chat/completions` endpoint.

pub mod client;

pub use client::{ChatClient, ChatConfig};

use crate::error::LlmError;
use async_trait::async_trait;

/// A single system + user exchange with a language model.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send one request and return the reply text.
    async fn generate(&self, system: &str, prompt: &str) -> Result<String, LlmError>;

    /// Model identifier for logging.
    fn model_name(&self) -> &str;
}
