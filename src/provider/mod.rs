//! External model providers.
//!
//! The gateway talks to two kinds of collaborators:
//! - completion providers (chat-style language models, optionally vision-capable)
//! - classifier providers (dedicated image-authenticity models)
//!
//! Both are opaque: send a prompt or payload, get text back.

mod openai;
mod replicate;
mod scripted;

pub use openai::OpenAiProvider;
pub use replicate::ReplicateClassifier;
pub use scripted::ScriptedProvider;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::ProvidersConfig;

/// Errors that can occur while calling a provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("request timed out")]
    Timeout,
    #[error("rate limited by provider")]
    RateLimited,
    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("missing credentials: set {0}")]
    MissingCredentials(String),
    #[error("provider unavailable: {0}")]
    Unavailable(String),
    #[error("unexpected provider response: {0}")]
    InvalidResponse(String),
}

/// One prompt for a completion provider.
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    pub prompt: String,
    /// Image attached as a data URI, for vision-capable models.
    pub image_data_uri: Option<String>,
    pub temperature: Option<f32>,
    /// Ask the provider to constrain its reply to a JSON object.
    pub json_mode: bool,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_image(mut self, data_uri: impl Into<String>) -> Self {
        self.image_data_uri = Some(data_uri.into());
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn json(mut self) -> Self {
        self.json_mode = true;
        self
    }
}

/// A chat-style language model.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError>;

    fn name(&self) -> &str;
}

/// A dedicated image-authenticity classifier.
#[async_trait]
pub trait ClassifierProvider: Send + Sync {
    /// Classify an image given as a data URI. Returns the raw reply text.
    async fn classify(&self, data_uri: &str) -> Result<String, ProviderError>;

    fn name(&self) -> &str;
}

/// The three collaborators the gateway needs.
#[derive(Clone)]
pub struct ProviderSet {
    pub text: Arc<dyn CompletionProvider>,
    pub vision: Arc<dyn CompletionProvider>,
    pub classifier: Arc<dyn ClassifierProvider>,
}

impl ProviderSet {
    /// Build HTTP-backed providers from configuration.
    ///
    /// Credentials are resolved here but a missing key is not an error until
    /// a call is made.
    pub fn from_config(config: &ProvidersConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("authentiscan/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            text: Arc::new(OpenAiProvider::new(http.clone(), &config.text)),
            vision: Arc::new(OpenAiProvider::new(http.clone(), &config.vision)),
            classifier: Arc::new(ReplicateClassifier::new(http, &config.classifier)),
        })
    }
}

/// Resolve an API key from an inline value or an environment variable.
pub(crate) fn resolve_api_key(inline: Option<&str>, env_var: &str) -> Option<String> {
    inline
        .map(str::to_string)
        .or_else(|| std::env::var(env_var).ok())
        .filter(|k| !k.trim().is_empty())
}

/// Map a transport error, separating timeouts.
pub(crate) fn map_transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout
    } else {
        ProviderError::Network(e)
    }
}

/// Map a non-success status to an error. Body is truncated for logs.
pub(crate) fn status_error(status: u16, body: &str) -> ProviderError {
    if status == 429 {
        return ProviderError::RateLimited;
    }
    let body: String = body.chars().take(200).collect();
    ProviderError::Status { status, body }
}

/// Read a success body and decode it.
///
/// Only failures while receiving the body are transport errors. A body that
/// arrives intact but does not decode is an `InvalidResponse`.
pub(crate) async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ProviderError> {
    let body = response.text().await.map_err(map_transport_error)?;
    decode_body(&body)
}

fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T, ProviderError> {
    serde_json::from_str(body).map_err(|e| {
        let preview: String = body.chars().take(80).collect();
        ProviderError::InvalidResponse(format!("malformed body ({}): {:?}", e, preview))
    })
}

pub(crate) fn timeout_from_ms(ms: Option<u64>) -> Option<Duration> {
    ms.filter(|ms| *ms > 0).map(Duration::from_millis)
}
