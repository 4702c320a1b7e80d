//! The analysis gateway.
//!
//! One request in, one [`Outcome`] out. Each operation is a linear pipeline:
//!
//! ```text
//! Validating -> CallingProviders -> Parsing -> (Success | Fallback)
//! ```
//!
//! Only validation failures are reported as failures. Provider and parse
//! errors are absorbed into a synthetic result, but the result is tagged as
//! a fallback so callers can still tell it apart from a real detection.

mod image;
mod replies;
mod text;

use thiserror::Error;
use tracing::warn;

use crate::config::Config;
use crate::model::{AnalysisRequest, AnalysisResult, Payload};
use crate::provider::{ProviderError, ProviderSet};

/// Message reported when text input is missing or blank.
pub const TEXT_REQUIRED: &str = "Text is required";
/// Message reported when image input is missing or empty.
pub const IMAGE_REQUIRED: &str = "Image is required";

/// Errors raised inside the analysis pipeline.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("{0}")]
    Validation(String),
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl AnalysisError {
    /// Short machine-readable category.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::Validation(_) => "validation",
            AnalysisError::Provider(_) => "provider",
            AnalysisError::Parse(_) => "parse",
            AnalysisError::Internal(_) => "internal",
        }
    }
}

/// What the gateway produced for one request.
#[derive(Debug)]
pub enum Outcome {
    /// The providers answered and their replies decoded.
    Success(AnalysisResult),
    /// The provider path failed; `result` is synthetic.
    Fallback {
        result: AnalysisResult,
        reason: AnalysisError,
    },
    /// Required input was missing. No provider was called.
    ValidationFailed(String),
}

impl Outcome {
    /// The result, if one was produced.
    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            Outcome::Success(result) | Outcome::Fallback { result, .. } => Some(result),
            Outcome::ValidationFailed(_) => None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Outcome::Fallback { .. })
    }

    pub fn fallback_reason(&self) -> Option<&AnalysisError> {
        match self {
            Outcome::Fallback { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

/// Options that shape results but not provider calls.
#[derive(Debug, Clone)]
pub struct GatewayOptions {
    /// Temperature for the text-analysis call.
    pub text_temperature: Option<f32>,
    /// Heatmap reference attached to image results.
    pub heatmap: String,
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self {
            text_temperature: Some(0.1),
            heatmap: crate::config::DEFAULT_HEATMAP.to_string(),
        }
    }
}

impl GatewayOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            text_temperature: config.providers.text.temperature,
            heatmap: config.analysis.heatmap.clone(),
        }
    }
}

/// Stateless front door over the configured providers.
pub struct Gateway {
    providers: ProviderSet,
    options: GatewayOptions,
}

impl Gateway {
    pub fn new(providers: ProviderSet, options: GatewayOptions) -> Self {
        Self { providers, options }
    }

    /// Build a gateway with HTTP-backed providers.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let providers = ProviderSet::from_config(&config.providers)?;
        Ok(Self::new(providers, GatewayOptions::from_config(config)))
    }

    /// Dispatch on the request's content kind.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Outcome {
        match request.payload {
            Payload::Text(_) => self.analyze_text(request).await,
            Payload::Image(_) => self.analyze_image(request).await,
        }
    }

    /// Analyze a text submission.
    pub async fn analyze_text(&self, request: &AnalysisRequest) -> Outcome {
        let text = match &request.payload {
            Payload::Text(text) if !text.trim().is_empty() => text,
            _ => return Outcome::ValidationFailed(TEXT_REQUIRED.to_string()),
        };

        match text::analyze(&self.providers, &self.options, text).await {
            Ok(result) => Outcome::Success(result),
            Err(reason) => {
                warn!(kind = reason.kind(), error = %reason, "text analysis fell back to synthetic result");
                Outcome::Fallback {
                    result: crate::synthetic::text_result(&mut rand::thread_rng()),
                    reason,
                }
            }
        }
    }

    /// Analyze an image submission, with an optional reference image.
    pub async fn analyze_image(&self, request: &AnalysisRequest) -> Outcome {
        let image = match &request.payload {
            Payload::Image(image) if !image.is_empty() => image,
            _ => return Outcome::ValidationFailed(IMAGE_REQUIRED.to_string()),
        };
        let reference = request.reference.as_ref().filter(|r| !r.is_empty());

        match image::analyze(&self.providers, &self.options, image, reference).await {
            Ok(result) => Outcome::Success(result),
            Err(reason) => {
                warn!(kind = reason.kind(), error = %reason, "image analysis fell back to synthetic result");
                Outcome::Fallback {
                    result: crate::synthetic::image_result(
                        &mut rand::thread_rng(),
                        &self.options.heatmap,
                        reference.is_some(),
                    ),
                    reason,
                }
            }
        }
    }
}
