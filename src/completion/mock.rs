use std::collections::VecDeque;
use std::sync::Mutex;

use super::{CompletionClient, CompletionError};

/// Scripted completion client for tests and offline demos.
///
/// Replies are served in order; once the script runs out the last reply
/// repeats. Every prompt received is recorded.
pub struct MockCompletionClient {
    replies: Mutex<VecDeque<Result<String, CompletionError>>>,
    last: Mutex<Option<Result<String, CompletionError>>>,
    prompts: Mutex<Vec<String>>,
}

impl MockCompletionClient {
    pub fn new(response: &str) -> Self {
        Self::scripted(vec![Ok(response.to_string())])
    }

    pub fn failing(error: CompletionError) -> Self {
        Self::scripted(vec![Err(error)])
    }

    pub fn scripted(replies: Vec<Result<String, CompletionError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            last: Mutex::new(None),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl CompletionClient for MockCompletionClient {
    fn model(&self) -> &str {
        "mock"
    }

    fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        let next = self.replies.lock().ok().and_then(|mut r| r.pop_front());
        let mut last = self
            .last
            .lock()
            .map_err(|_| CompletionError::HttpClient("mock lock poisoned".into()))?;
        if let Some(reply) = next {
            *last = Some(reply);
        }
        last.clone().unwrap_or(Err(CompletionError::EmptyCompletion))
    }
}
