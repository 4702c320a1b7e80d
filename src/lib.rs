//! Authentiscan - AI content detection gateway.
//!
//! Authentiscan accepts text or images, asks external model providers
//! whether the content is AI-generated, and normalizes their replies into
//! one result schema. When a provider is unreachable or replies with
//! something unusable, a synthetic result is produced instead and tagged as
//! a fallback.
//!
//! # Architecture
//!
//! - `gateway`: the analysis pipelines and the `Outcome` type
//! - `provider`: provider traits plus HTTP and scripted implementations
//! - `extract`: JSON and probability recovery from free-text replies
//! - `prompts`: prompt templates
//! - `synthetic`: fallback result generation
//! - `model` / `score`: result types and bounded numeric values
//! - `server`: axum HTTP routes
//! - `config`: YAML configuration
//! - `report`: JSON wire shapes and terminal output

pub mod cli;
pub mod config;
pub mod extract;
pub mod gateway;
pub mod model;
pub mod prompts;
pub mod provider;
pub mod report;
pub mod score;
pub mod server;
pub mod synthetic;

pub use config::Config;
pub use gateway::{AnalysisError, Gateway, GatewayOptions, Outcome};
pub use model::{
    AnalysisRequest, AnalysisResult, ArtifactFinding, ContentKind, ImagePayload,
    ModelAttribution, TextMetrics,
};
pub use provider::{ProviderError, ProviderSet, ScriptedProvider};
pub use score::{Percent, Verdict};

use tracing_subscriber::EnvFilter;

/// Environment variable read for the log filter.
pub const LOG_ENV: &str = "AUTHENTISCAN_LOG";

/// Initialize logging to stderr.
///
/// The filter comes from `AUTHENTISCAN_LOG` when set, else `default_level`.
/// Safe to call more than once.
pub fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
