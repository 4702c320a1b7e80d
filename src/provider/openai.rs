//! OpenAI-compatible chat completion client.
//!
//! Sends: POST {base_url}/chat/completions
//! Images are attached as `image_url` content parts carrying a data URI.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use super::{
    map_transport_error, read_json, resolve_api_key, status_error, timeout_from_ms,
    CompletionProvider, CompletionRequest, ProviderError,
};
use crate::config::CompletionProviderConfig;

pub struct OpenAiProvider {
    http: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    api_key_env: String,
    timeout: Option<Duration>,
}

impl OpenAiProvider {
    pub fn new(http: Client, config: &CompletionProviderConfig) -> Self {
        Self {
            http,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            api_key: resolve_api_key(config.api_key.as_deref(), &config.api_key_env),
            api_key_env: config.api_key_env.clone(),
            timeout: timeout_from_ms(config.timeout_ms),
        }
    }

    /// Build the JSON body for a chat completion call.
    fn request_body(&self, request: &CompletionRequest) -> Value {
        let content = match &request.image_data_uri {
            Some(uri) => json!([
                { "type": "text", "text": request.prompt },
                { "type": "image_url", "image_url": { "url": uri } },
            ]),
            None => Value::String(request.prompt.clone()),
        };

        let mut body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": content }],
        });

        if let Some(temperature) = request.temperature {
            body["temperature"] = json!(temperature);
        }
        if request.json_mode {
            body["response_format"] = json!({ "type": "json_object" });
        }
        body
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::MissingCredentials(self.api_key_env.clone()))?;

        debug!(
            model = %self.model,
            vision = request.image_data_uri.is_some(),
            "sending chat completion"
        );

        let mut call = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&self.request_body(&request));
        if let Some(timeout) = self.timeout {
            call = call.timeout(timeout);
        }

        let response = call.send().await.map_err(map_transport_error)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), &body));
        }

        let parsed: ChatResponse = read_json(response).await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ProviderError::InvalidResponse("no content in response".to_string()))
    }

    fn name(&self) -> &str {
        &self.model
    }
}
