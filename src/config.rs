//! Configuration schema for authentiscan.
//!
//! Configuration is YAML. Every field has a default, so an empty file (or no
//! file at all) yields a working setup that reads credentials from the
//! environment.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Default configuration file names to search for.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["authentiscan.yaml", ".authentiscan.yaml"];

/// Configuration template written by `authentiscan init`.
pub const TEMPLATE: &str = include_str!("templates/authentiscan.yaml");

/// Sentinel the reference heatmap points at. No heatmap is computed.
pub const DEFAULT_HEATMAP: &str = "/placeholder.svg?height=400&width=600";

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

impl Config {
    /// Parse a configuration from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::parse_str(&content)
    }

    pub fn parse_str(content: &str) -> anyhow::Result<Self> {
        // An empty document deserializes as unit, not as an empty map
        if content.trim().is_empty() {
            return Ok(Config::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load from an explicit path, or discover one, or fall back to defaults.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<(Self, Option<PathBuf>)> {
        let path = match explicit {
            Some(p) => Some(p.to_path_buf()),
            None => discover(),
        };
        let config = match &path {
            Some(p) => Self::parse_file(p)
                .map_err(|e| anyhow::anyhow!("failed to parse {}: {}", p.display(), e))?,
            None => Config::default(),
        };
        validate(&config)?;
        Ok((config, path))
    }
}

/// Find a configuration file in the working directory, then the user config dir.
pub fn discover() -> Option<PathBuf> {
    for name in DEFAULT_CONFIG_NAMES {
        let path = PathBuf::from(name);
        if path.exists() {
            return Some(path);
        }
    }
    ProjectDirs::from("", "", "authentiscan")
        .map(|dirs| dirs.config_dir().join(DEFAULT_CONFIG_NAMES[0]))
        .filter(|p| p.exists())
}

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Address to listen on (default: 127.0.0.1:3000)
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum request body size in bytes (default: 20 MiB)
    #[serde(default = "default_max_upload")]
    pub max_upload_bytes: usize,
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_max_upload() -> usize {
    20 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_upload_bytes: default_max_upload(),
        }
    }
}

/// Provider endpoints.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProvidersConfig {
    #[serde(default = "CompletionProviderConfig::text_default")]
    pub text: CompletionProviderConfig,
    #[serde(default = "CompletionProviderConfig::vision_default")]
    pub vision: CompletionProviderConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            text: CompletionProviderConfig::text_default(),
            vision: CompletionProviderConfig::vision_default(),
            classifier: ClassifierConfig::default(),
        }
    }
}

/// An OpenAI-compatible chat completion endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CompletionProviderConfig {
    #[serde(default = "default_openai_base")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Environment variable holding the API key (default: OPENAI_API_KEY)
    #[serde(default = "default_openai_key_env")]
    pub api_key_env: String,
    /// Inline API key; takes precedence over `api_key_env`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Sampling temperature; unset means provider default
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Request timeout in milliseconds; unset means transport default
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

fn default_openai_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_openai_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

impl CompletionProviderConfig {
    /// Text analysis runs at low temperature to keep replies stable.
    pub fn text_default() -> Self {
        Self {
            temperature: Some(0.1),
            ..Self::vision_default()
        }
    }

    pub fn vision_default() -> Self {
        Self {
            base_url: default_openai_base(),
            model: default_model(),
            api_key_env: default_openai_key_env(),
            api_key: None,
            temperature: None,
            timeout_ms: None,
        }
    }
}

/// A Replicate-style image-authenticity classifier.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClassifierConfig {
    #[serde(default = "default_replicate_base")]
    pub base_url: String,
    /// Model version hash
    #[serde(default = "default_classifier_version")]
    pub version: String,
    /// Input field the model expects the data URI under (default: image)
    #[serde(default = "default_input_key")]
    pub input_key: String,
    /// Environment variable holding the API token (default: REPLICATE_API_TOKEN)
    #[serde(default = "default_replicate_key_env")]
    pub api_key_env: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

fn default_replicate_base() -> String {
    "https://api.replicate.com/v1".to_string()
}

fn default_classifier_version() -> String {
    "1a1515b0e52329d1c9be9b9102e8a1c1a0826a6f2f04b1f39dcd656a25f1f5ba".to_string()
}

fn default_input_key() -> String {
    "image".to_string()
}

fn default_replicate_key_env() -> String {
    "REPLICATE_API_TOKEN".to_string()
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            base_url: default_replicate_base(),
            version: default_classifier_version(),
            input_key: default_input_key(),
            api_key_env: default_replicate_key_env(),
            api_key: None,
            timeout_ms: None,
        }
    }
}

/// Settings that shape analysis results.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalysisConfig {
    /// Heatmap reference attached to image results
    #[serde(default = "default_heatmap")]
    pub heatmap: String,
}

fn default_heatmap() -> String {
    DEFAULT_HEATMAP.to_string()
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            heatmap: default_heatmap(),
        }
    }
}

/// Validate a configuration for correctness.
pub fn validate(config: &Config) -> anyhow::Result<()> {
    config
        .server
        .bind
        .parse::<SocketAddr>()
        .map_err(|e| anyhow::anyhow!("invalid server.bind {:?}: {}", config.server.bind, e))?;

    if config.server.max_upload_bytes == 0 {
        anyhow::bail!("server.max_upload_bytes must be greater than zero");
    }

    for (name, provider) in [
        ("text", &config.providers.text),
        ("vision", &config.providers.vision),
    ] {
        if provider.model.trim().is_empty() {
            anyhow::bail!("providers.{}.model must not be empty", name);
        }
        validate_url(&format!("providers.{}.base_url", name), &provider.base_url)?;
        if let Some(t) = provider.temperature {
            if !(0.0..=2.0).contains(&t) {
                anyhow::bail!("providers.{}.temperature {} is outside 0.0-2.0", name, t);
            }
        }
    }

    let classifier = &config.providers.classifier;
    validate_url("providers.classifier.base_url", &classifier.base_url)?;
    if classifier.version.trim().is_empty() {
        anyhow::bail!("providers.classifier.version must not be empty");
    }
    if classifier.input_key.trim().is_empty() {
        anyhow::bail!("providers.classifier.input_key must not be empty");
    }

    Ok(())
}

fn validate_url(field: &str, url: &str) -> anyhow::Result<()> {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        anyhow::bail!("invalid {} {:?}, must start with http:// or https://", field, url);
    }
    Ok(())
}
