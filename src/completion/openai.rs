use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{CompletionClient, CompletionError};
use crate::config::CompletionSettings;

/// Blocking client for OpenAI-compatible `/chat/completions` endpoints
/// (Groq, OpenAI, vLLM, llama.cpp server).
///
/// The underlying `reqwest::blocking::Client` is built per request so the
/// handle itself can be created and dropped inside an async runtime.
pub struct OpenAiCompatClient {
    base_url: String,
    model: String,
    api_key: String,
    timeout_secs: u64,
}

impl OpenAiCompatClient {
    pub fn new(settings: &CompletionSettings) -> Self {
        Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key: settings.api_key.clone(),
            timeout_secs: settings.timeout_secs,
        }
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn http(&self) -> Result<reqwest::blocking::Client, CompletionError> {
        reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| CompletionError::HttpClient(e.to_string()))
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Pull the first choice's text out of a chat completion body.
fn extract_content(body: &str) -> Result<String, CompletionError> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| CompletionError::ResponseParsing(e.to_string()))?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or(CompletionError::EmptyCompletion)
}

impl CompletionClient for OpenAiCompatClient {
    fn model(&self) -> &str {
        &self.model
    }

    fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let started = std::time::Instant::now();
        let response = self
            .http()?
            .post(self.chat_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    CompletionError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    CompletionError::Timeout(self.timeout_secs)
                } else {
                    CompletionError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .map_err(|e| CompletionError::ResponseParsing(e.to_string()))?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), model = %self.model, "Completion request rejected");
            return Err(CompletionError::Service {
                status: status.as_u16(),
                body: text,
            });
        }

        let content = extract_content(&text)?;
        tracing::debug!(
            model = %self.model,
            prompt_chars = prompt.len(),
            completion_chars = content.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Completion received"
        );
        Ok(content)
    }
}
