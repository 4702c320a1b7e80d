//! Expected shapes of provider replies.
//!
//! Decoding is strict about the fields the result cannot do without and
//! lenient about the rest. Numeric ranges are enforced afterwards by the
//! result constructors, not here.

use serde::Deserialize;

use crate::model::{ArtifactFinding, ModelAttribution, TextMetrics};

/// Reply to the text-analysis prompt.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextReply {
    pub ai_probability: f64,
    pub confidence: f64,
    pub metrics: MetricsReply,
    #[serde(default)]
    pub indicators: Vec<IndicatorReply>,
    pub model_detection: ModelDetectionReply,
    #[serde(default)]
    pub explanation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MetricsReply {
    pub perplexity: f64,
    pub burstiness: f64,
    pub entropy: f64,
    pub repetitiveness: f64,
}

impl From<MetricsReply> for TextMetrics {
    fn from(m: MetricsReply) -> Self {
        TextMetrics::new(m.perplexity, m.burstiness, m.entropy, m.repetitiveness)
    }
}

#[derive(Debug, Deserialize)]
pub struct IndicatorReply {
    pub name: String,
    pub score: f64,
    #[serde(default)]
    pub description: Option<String>,
}

impl From<IndicatorReply> for ArtifactFinding {
    fn from(i: IndicatorReply) -> Self {
        ArtifactFinding::new(i.name, i.description.unwrap_or_default(), i.score)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDetectionReply {
    pub detected_model: String,
    pub probability: f64,
}

impl From<ModelDetectionReply> for ModelAttribution {
    fn from(m: ModelDetectionReply) -> Self {
        ModelAttribution::new(m.detected_model, m.probability)
    }
}

/// Reply to the image-forensics prompt.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForensicsReply {
    #[serde(default)]
    pub detected_artifacts: Vec<ArtifactReply>,
    pub model_detection: ModelDetectionReply,
    #[serde(default, alias = "explanation")]
    pub analysis_explanation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ArtifactReply {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub score: f64,
}

impl From<ArtifactReply> for ArtifactFinding {
    fn from(a: ArtifactReply) -> Self {
        ArtifactFinding::new(a.name, a.description, a.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_reply_requires_core_fields() {
        let missing_metrics = r#"{
            "aiProbability": 50, "confidence": 90,
            "modelDetection": {"detectedModel": "GPT-4", "probability": 80}
        }"#;
        assert!(serde_json::from_str::<TextReply>(missing_metrics).is_err());
    }

    #[test]
    fn test_text_reply_optional_fields() {
        let reply: TextReply = serde_json::from_str(
            r#"{
            "aiProbability": 50, "humanProbability": 50, "confidence": 90,
            "metrics": {"perplexity": 40, "burstiness": 0.5, "entropy": 4, "repetitiveness": 0.2},
            "modelDetection": {"detectedModel": "GPT-4", "probability": 80}
        }"#,
        )
        .unwrap();
        assert!(reply.indicators.is_empty());
        assert!(reply.explanation.is_none());
    }

    #[test]
    fn test_forensics_reply_accepts_explanation_alias() {
        let reply: ForensicsReply = serde_json::from_str(
            r#"{
            "detectedArtifacts": [{"name": "Lighting", "score": 70}],
            "modelDetection": {"detectedModel": "Midjourney", "probability": 60},
            "explanation": "Shadows disagree."
        }"#,
        )
        .unwrap();
        assert_eq!(reply.detected_artifacts[0].description, "");
        assert_eq!(reply.analysis_explanation.as_deref(), Some("Shadows disagree."));
    }
}
