//! Completion service client.
//!
//! One prompt in, one text completion out. The trait is synchronous and
//! implementations may block; async callers run it on
//! `tokio::task::spawn_blocking`.

pub mod mock;
pub mod openai;

pub use mock::MockCompletionClient;
pub use openai::OpenAiCompatClient;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    #[error("Completion service is not reachable at {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Completion service returned error (status {status}): {body}")]
    Service { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Completion contained no text")]
    EmptyCompletion,
}

/// Text completion seam.
pub trait CompletionClient: Send + Sync {
    /// Model identifier sent with every request.
    fn model(&self) -> &str;

    /// Send `prompt` as a single user message and return the completion text.
    fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}
