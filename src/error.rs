//! Error types for data-source and LLM calls.

use thiserror::Error;

pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Failure of a single data-source request.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("API error: {0}")]
    Api(String),

    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("No data for {0}")]
    NoData(String),
}

/// Failure of the text-generation call.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("No API key configured (set OPENAI_API_KEY)")]
    MissingApiKey,

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Cannot connect to LLM endpoint at {0}")]
    Connect(String),

    #[error("Failed to send request: {0}")]
    Request(#[from] reqwest::Error),

    #[error("LLM API error {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("LLM returned no content")]
    EmptyResponse,
}
