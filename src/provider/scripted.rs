//! Deterministic provider for tests.
//!
//! Replies are served from a queue in order; once the queue is drained the
//! default reply is used. Every call is counted and its prompt recorded.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{ClassifierProvider, CompletionProvider, CompletionRequest, ProviderError};

enum Reply {
    Text(String),
    Fail(String),
}

pub struct ScriptedProvider {
    name: String,
    queue: Mutex<VecDeque<Reply>>,
    default_reply: Option<String>,
    call_count: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    /// A provider that replies with `default_reply` when nothing is queued.
    pub fn new(default_reply: impl Into<String>) -> Self {
        Self {
            name: "scripted".to_string(),
            queue: Mutex::new(VecDeque::new()),
            default_reply: Some(default_reply.into()),
            call_count: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A provider whose every call fails with a network-style error.
    pub fn failing() -> Self {
        Self {
            default_reply: None,
            ..Self::new("")
        }
    }

    /// Queue a successful reply.
    pub fn then_reply(self, text: impl Into<String>) -> Self {
        self.push(Reply::Text(text.into()));
        self
    }

    /// Queue a failure.
    pub fn then_fail(self, message: impl Into<String>) -> Self {
        self.push(Reply::Fail(message.into()));
        self
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Prompts (or data URIs, for classification) seen so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    fn push(&self, reply: Reply) {
        if let Ok(mut queue) = self.queue.lock() {
            queue.push_back(reply);
        }
    }

    fn next_reply(&self, prompt: &str) -> Result<String, ProviderError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        let queued = self.queue.lock().ok().and_then(|mut q| q.pop_front());
        match queued {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Fail(message)) => Err(ProviderError::Unavailable(message)),
            None => self
                .default_reply
                .clone()
                .ok_or_else(|| ProviderError::Unavailable("scripted failure".to_string())),
        }
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        self.next_reply(&request.prompt)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl ClassifierProvider for ScriptedProvider {
    async fn classify(&self, data_uri: &str) -> Result<String, ProviderError> {
        self.next_reply(data_uri)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
