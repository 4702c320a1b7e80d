//! Replicate-style prediction client for image-authenticity models.
//!
//! Sends: POST {base_url}/predictions with `Prefer: wait` so the call
//! blocks until the prediction finishes. Predictions that are still running
//! when the provider returns are treated as unavailable.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use super::{
    map_transport_error, read_json, resolve_api_key, status_error, timeout_from_ms,
    ClassifierProvider, ProviderError,
};
use crate::config::ClassifierConfig;

pub struct ReplicateClassifier {
    http: Client,
    endpoint: String,
    version: String,
    input_key: String,
    api_key: Option<String>,
    api_key_env: String,
    timeout: Option<Duration>,
}

impl ReplicateClassifier {
    pub fn new(http: Client, config: &ClassifierConfig) -> Self {
        Self {
            http,
            endpoint: format!("{}/predictions", config.base_url.trim_end_matches('/')),
            version: config.version.clone(),
            input_key: config.input_key.clone(),
            api_key: resolve_api_key(config.api_key.as_deref(), &config.api_key_env),
            api_key_env: config.api_key_env.clone(),
            timeout: timeout_from_ms(config.timeout_ms),
        }
    }

    fn request_body(&self, data_uri: &str) -> Value {
        let mut input = serde_json::Map::new();
        input.insert(self.input_key.clone(), Value::String(data_uri.to_string()));
        json!({ "version": self.version, "input": input })
    }
}

#[derive(Deserialize)]
struct Prediction {
    #[serde(default)]
    status: String,
    #[serde(default)]
    output: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

/// Flatten a prediction's `output` into text.
fn output_to_text(output: &Value) -> String {
    match output {
        Value::String(s) => s.clone(),
        Value::Array(items) if items.iter().all(Value::is_string) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .concat(),
        other => other.to_string(),
    }
}

#[async_trait]
impl ClassifierProvider for ReplicateClassifier {
    async fn classify(&self, data_uri: &str) -> Result<String, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::MissingCredentials(self.api_key_env.clone()))?;

        debug!(version = %self.version, bytes = data_uri.len(), "submitting prediction");

        let mut call = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .header("Prefer", "wait")
            .json(&self.request_body(data_uri));
        if let Some(timeout) = self.timeout {
            call = call.timeout(timeout);
        }

        let response = call.send().await.map_err(map_transport_error)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), &body));
        }

        let prediction: Prediction = read_json(response).await?;
        match prediction.status.as_str() {
            "succeeded" => prediction
                .output
                .as_ref()
                .map(output_to_text)
                .ok_or_else(|| ProviderError::InvalidResponse("prediction has no output".to_string())),
            "failed" | "canceled" => Err(ProviderError::Unavailable(
                prediction
                    .error
                    .map(|e| output_to_text(&e))
                    .unwrap_or_else(|| format!("prediction {}", prediction.status)),
            )),
            other => Err(ProviderError::Unavailable(format!(
                "prediction did not complete (status {:?})",
                other
            ))),
        }
    }

    fn name(&self) -> &str {
        &self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_to_text() {
        assert_eq!(output_to_text(&json!("0.73")), "0.73");
        assert_eq!(output_to_text(&json!(["fake: ", "0.9"])), "fake: 0.9");
        assert_eq!(
            output_to_text(&json!({"fake_probability": 0.2})),
            r#"{"fake_probability":0.2}"#
        );
        assert_eq!(output_to_text(&json!(0.5)), "0.5");
    }

    #[test]
    fn test_request_body_uses_input_key() {
        let config = ClassifierConfig {
            input_key: "prompt".to_string(),
            api_key: Some("r8_test".to_string()),
            ..ClassifierConfig::default()
        };
        let classifier = ReplicateClassifier::new(Client::new(), &config);
        let body = classifier.request_body("data:image/png;base64,AA==");
        assert_eq!(body["input"]["prompt"], "data:image/png;base64,AA==");
        assert_eq!(body["version"], config.version.as_str());
    }
}
