//! Output formatting for analysis results.
//!
//! Supports two output formats:
//! - JSON: the wire shape served by the HTTP endpoints
//! - Pretty: colored terminal output for human readability

use colored::*;
use serde::{Deserialize, Serialize};

use crate::gateway::{AnalysisError, Outcome};
use crate::model::{AnalysisResult, ArtifactFinding, ContentKind, ModelAttribution, TextMetrics};
use crate::score::{Difference, Percent};

pub const SOURCE_PROVIDER: &str = "provider";
pub const SOURCE_FALLBACK: &str = "fallback";

// =============================================================================
// JSON Format
// =============================================================================

/// Response body for `POST /analyze-text`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextAnalysisResponse {
    pub ai_probability: f64,
    pub human_probability: f64,
    pub confidence: f64,
    pub metrics: JsonMetrics,
    pub indicators: Vec<JsonIndicator>,
    pub model_detection: JsonModelDetection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    pub verdict: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

/// Response body for `POST /analyze-image`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAnalysisResponse {
    pub ai_probability: f64,
    pub real_probability: f64,
    pub confidence: f64,
    pub heatmap: String,
    pub detected_artifacts: Vec<JsonArtifact>,
    pub model_detection: JsonModelDetection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    pub verdict: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_image_analysis: Option<JsonComparison>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonMetrics {
    pub perplexity: f64,
    pub burstiness: f64,
    pub entropy: f64,
    pub repetitiveness: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonIndicator {
    pub name: String,
    pub score: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonArtifact {
    pub name: String,
    pub description: String,
    pub score: f64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonModelDetection {
    pub detected_model: String,
    pub probability: f64,
}

/// Scores for the reference image and how far they sit from the suspect's.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonComparison {
    pub ai_probability: f64,
    pub real_probability: f64,
    pub confidence: f64,
    pub difference: String,
}

/// Error body for 4xx/5xx responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonError {
    pub error: String,
}

impl JsonError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

fn source_of(reason: Option<&AnalysisError>) -> (String, Option<String>) {
    match reason {
        Some(reason) => (SOURCE_FALLBACK.to_string(), Some(reason.to_string())),
        None => (SOURCE_PROVIDER.to_string(), None),
    }
}

fn metrics_to_json(metrics: Option<&TextMetrics>) -> JsonMetrics {
    // Text results always carry metrics; zeros only guard a misrouted result
    match metrics {
        Some(m) => JsonMetrics {
            perplexity: m.perplexity.value(),
            burstiness: m.burstiness.value(),
            entropy: m.entropy,
            repetitiveness: m.repetitiveness.value(),
        },
        None => JsonMetrics {
            perplexity: 0.0,
            burstiness: 0.0,
            entropy: 0.0,
            repetitiveness: 0.0,
        },
    }
}

fn attribution_to_json(a: &ModelAttribution) -> JsonModelDetection {
    JsonModelDetection {
        detected_model: a.detected_model.clone(),
        probability: a.probability.value(),
    }
}

fn artifact_to_json(f: &ArtifactFinding) -> JsonArtifact {
    JsonArtifact {
        name: f.name.clone(),
        description: f.description.clone(),
        score: f.score.value(),
    }
}

impl TextAnalysisResponse {
    pub fn new(result: &AnalysisResult, reason: Option<&AnalysisError>) -> Self {
        let (source, fallback_reason) = source_of(reason);
        Self {
            ai_probability: result.ai_probability.value(),
            human_probability: result.complementary_probability().value(),
            confidence: result.confidence.value(),
            metrics: metrics_to_json(result.metrics.as_ref()),
            indicators: result
                .findings
                .iter()
                .map(|f| JsonIndicator {
                    name: f.name.clone(),
                    score: f.score.value(),
                })
                .collect(),
            model_detection: attribution_to_json(&result.attribution),
            explanation: result.explanation.clone(),
            verdict: result.verdict().label().to_string(),
            source,
            fallback_reason,
        }
    }
}

impl ImageAnalysisResponse {
    pub fn new(result: &AnalysisResult, reason: Option<&AnalysisError>) -> Self {
        let (source, fallback_reason) = source_of(reason);
        let original_image_analysis = result.comparison.as_deref().map(|c| JsonComparison {
            ai_probability: c.ai_probability.value(),
            real_probability: c.complementary_probability().value(),
            confidence: c.confidence.value(),
            difference: Difference::between(result.ai_probability, c.ai_probability)
                .label()
                .to_string(),
        });

        Self {
            ai_probability: result.ai_probability.value(),
            real_probability: result.complementary_probability().value(),
            confidence: result.confidence.value(),
            heatmap: result.heatmap.clone().unwrap_or_default(),
            detected_artifacts: result.findings.iter().map(artifact_to_json).collect(),
            model_detection: attribution_to_json(&result.attribution),
            explanation: result.explanation.clone(),
            verdict: result.verdict().label().to_string(),
            source,
            fallback_reason,
            original_image_analysis,
        }
    }
}

/// Wire JSON for a result, shaped by its content kind.
pub fn to_json_value(
    result: &AnalysisResult,
    reason: Option<&AnalysisError>,
) -> serde_json::Result<serde_json::Value> {
    match result.kind {
        ContentKind::Text => serde_json::to_value(TextAnalysisResponse::new(result, reason)),
        ContentKind::Image => serde_json::to_value(ImageAnalysisResponse::new(result, reason)),
    }
}

/// Write an outcome in JSON format.
pub fn write_json(outcome: &Outcome) -> anyhow::Result<()> {
    let value = match outcome {
        Outcome::Success(result) => to_json_value(result, None)?,
        Outcome::Fallback { result, reason } => to_json_value(result, Some(reason))?,
        Outcome::ValidationFailed(message) => serde_json::to_value(JsonError::new(message))?,
    };
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write an outcome in pretty (human-readable) format.
pub fn write_pretty(subject: &str, outcome: &Outcome) {
    // Header
    println!();
    print!("  ");
    print!("{}", "authentiscan".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Analyzing: ".dimmed());
    println!("{}", subject);
    println!();

    let result = match outcome {
        Outcome::ValidationFailed(message) => {
            println!("  {} {}", "✗".red().bold(), message.red());
            println!();
            return;
        }
        Outcome::Success(result) => result,
        Outcome::Fallback { result, reason } => {
            println!(
                "  {} {}",
                "!".yellow().bold(),
                "Provider unavailable, showing synthetic result".yellow()
            );
            println!("    {}", reason.to_string().dimmed());
            println!();
            result
        }
    };

    write_summary(result);
    println!();

    if let Some(metrics) = &result.metrics {
        write_metrics(metrics);
        println!();
    }

    if !result.findings.is_empty() {
        write_findings(result);
        println!();
    }

    write_attribution(&result.attribution);

    if let Some(comparison) = &result.comparison {
        println!();
        write_comparison(result, comparison);
    }

    if let Some(explanation) = &result.explanation {
        println!();
        println!("  {}", "Explanation".bold());
        println!("    {}", explanation);
    }
    println!();
}

fn colored_percent(p: Percent) -> ColoredString {
    let text = p.to_string();
    match p.value() {
        v if v > 80.0 => text.red().bold(),
        v if v > 60.0 => text.yellow(),
        v if v > 40.0 => text.normal(),
        _ => text.green(),
    }
}

fn write_summary(result: &AnalysisResult) {
    let human_label = match result.kind {
        ContentKind::Text => "Human-written:",
        ContentKind::Image => "Authentic:    ",
    };
    println!("  {} {}", "Verdict:".bold(), result.verdict().to_string().bold());
    println!(
        "    {} {}",
        "AI-generated: ".dimmed(),
        colored_percent(result.ai_probability)
    );
    println!(
        "    {} {}",
        human_label.dimmed(),
        result.complementary_probability()
    );
    println!("    {} {}", "Confidence:   ".dimmed(), result.confidence);
}

fn write_metrics(metrics: &TextMetrics) {
    println!("  {}", "Metrics".bold());
    println!("    {:<16} {:>6.1}", "perplexity", metrics.perplexity.value());
    println!("    {:<16} {:>6.2}", "burstiness", metrics.burstiness.value());
    println!("    {:<16} {:>6.2}", "entropy", metrics.entropy);
    println!("    {:<16} {:>6.2}", "repetitiveness", metrics.repetitiveness.value());
}

fn write_findings(result: &AnalysisResult) {
    let heading = match result.kind {
        ContentKind::Text => "Indicators",
        ContentKind::Image => "Detected artifacts",
    };
    println!("  {}", heading.bold());
    for finding in &result.findings {
        println!("    {:<32} {}", finding.name, colored_percent(finding.score));
        if !finding.description.is_empty() {
            println!("      {}", finding.description.dimmed());
        }
    }
}

fn write_attribution(attribution: &ModelAttribution) {
    println!(
        "  {} {} ({})",
        "Likely model:".bold(),
        attribution.detected_model,
        attribution.probability
    );
}

fn write_comparison(result: &AnalysisResult, comparison: &AnalysisResult) {
    let difference = Difference::between(result.ai_probability, comparison.ai_probability);
    println!("  {}", "Comparison".bold());
    println!(
        "    {} {}",
        "Original image AI probability: ".dimmed(),
        comparison.ai_probability
    );
    println!(
        "    {} {}",
        "Suspected image AI probability:".dimmed(),
        result.ai_probability
    );
    let label = match difference {
        Difference::Significant => difference.label().red().bold(),
        Difference::Moderate => difference.label().yellow(),
        Difference::Similar => difference.label().green(),
    };
    println!("    {} {}", label, difference.summary());
}
