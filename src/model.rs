//! Core value types for analysis requests and results.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;

use crate::score::{clamp, Fraction, Percent, Verdict};

/// Kind of content submitted for analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
    Image,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Text => "text",
            ContentKind::Image => "image",
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

const OCTET_STREAM: &str = "application/octet-stream";

/// Raw image bytes plus the media type they were uploaded with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl ImagePayload {
    /// Build a payload, sniffing the media type when none was declared.
    pub fn new(bytes: Vec<u8>, mime_type: Option<String>) -> Self {
        let mime_type = match mime_type {
            Some(m) if !m.trim().is_empty() && m != OCTET_STREAM => m,
            _ => sniff_mime_type(&bytes).to_string(),
        };
        Self { bytes, mime_type }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Encode as `data:<mime>;base64,<payload>`.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }
}

/// Guess an image media type from its magic bytes.
pub fn sniff_mime_type(bytes: &[u8]) -> &'static str {
    match bytes {
        [0x89, b'P', b'N', b'G', ..] => "image/png",
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [b'G', b'I', b'F', b'8', ..] => "image/gif",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        _ => OCTET_STREAM,
    }
}

/// The body of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Image(ImagePayload),
}

/// One unit of work for the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub payload: Payload,
    /// Optional reference item (images only) to compare against.
    pub reference: Option<ImagePayload>,
}

impl AnalysisRequest {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            payload: Payload::Text(text.into()),
            reference: None,
        }
    }

    pub fn image(image: ImagePayload) -> Self {
        Self {
            payload: Payload::Image(image),
            reference: None,
        }
    }

    pub fn with_reference(mut self, reference: ImagePayload) -> Self {
        self.reference = Some(reference);
        self
    }

    pub fn kind(&self) -> ContentKind {
        match self.payload {
            Payload::Text(_) => ContentKind::Text,
            Payload::Image(_) => ContentKind::Image,
        }
    }
}

/// Upper bound for the entropy metric.
pub const MAX_ENTROPY: f64 = 5.0;

/// Linguistic sub-metrics reported for text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TextMetrics {
    /// 0-100, lower suggests AI.
    pub perplexity: Percent,
    /// 0-1, higher suggests human.
    pub burstiness: Fraction,
    /// 0-5, higher suggests human.
    pub entropy: f64,
    /// 0-1, higher suggests AI.
    pub repetitiveness: Fraction,
}

impl TextMetrics {
    pub fn new(perplexity: f64, burstiness: f64, entropy: f64, repetitiveness: f64) -> Self {
        Self {
            perplexity: Percent::new(perplexity),
            burstiness: Fraction::new(burstiness),
            entropy: clamp(entropy, 0.0, MAX_ENTROPY),
            repetitiveness: Fraction::new(repetitiveness),
        }
    }
}

/// One named piece of evidence for or against synthetic origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtifactFinding {
    pub name: String,
    pub description: String,
    pub score: Percent,
}

impl ArtifactFinding {
    pub fn new(name: impl Into<String>, description: impl Into<String>, score: f64) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            score: Percent::new(score),
        }
    }
}

/// Best guess at which generative system produced the content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelAttribution {
    pub detected_model: String,
    pub probability: Percent,
}

impl ModelAttribution {
    pub fn new(detected_model: impl Into<String>, probability: f64) -> Self {
        Self {
            detected_model: detected_model.into(),
            probability: Percent::new(probability),
        }
    }

    /// Placeholder attribution for results that carry no provider guess.
    pub fn unknown() -> Self {
        Self::new("Unknown", 0.0)
    }
}

/// The normalized result of one analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub kind: ContentKind,
    pub ai_probability: Percent,
    pub confidence: Percent,
    pub findings: Vec<ArtifactFinding>,
    pub attribution: ModelAttribution,
    pub explanation: Option<String>,
    /// Text only.
    pub metrics: Option<TextMetrics>,
    /// Image only: reference to a heatmap visual.
    pub heatmap: Option<String>,
    /// Result for the reference item, when one was supplied.
    pub comparison: Option<Box<AnalysisResult>>,
}

impl AnalysisResult {
    /// Probability of human/authentic origin. Always `100 - ai_probability`.
    pub fn complementary_probability(&self) -> Percent {
        self.ai_probability.complement()
    }

    pub fn verdict(&self) -> Verdict {
        Verdict::from_probability(self.ai_probability, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_mime_type() {
        assert_eq!(sniff_mime_type(&[0x89, b'P', b'N', b'G', 0x0D]), "image/png");
        assert_eq!(sniff_mime_type(&[0xFF, 0xD8, 0xFF, 0xE0]), "image/jpeg");
        assert_eq!(sniff_mime_type(b"GIF89a"), "image/gif");
        assert_eq!(sniff_mime_type(b"RIFF\0\0\0\0WEBPVP8 "), "image/webp");
        assert_eq!(sniff_mime_type(b"hello"), "application/octet-stream");
    }

    #[test]
    fn test_declared_mime_type_wins() {
        let payload = ImagePayload::new(vec![0xFF, 0xD8, 0xFF], Some("image/heic".to_string()));
        assert_eq!(payload.mime_type, "image/heic");

        let payload = ImagePayload::new(vec![0xFF, 0xD8, 0xFF], None);
        assert_eq!(payload.mime_type, "image/jpeg");
    }

    #[test]
    fn test_data_uri() {
        let payload = ImagePayload::new(b"abc".to_vec(), Some("image/png".to_string()));
        assert_eq!(payload.to_data_uri(), "data:image/png;base64,YWJj");
    }

    #[test]
    fn test_text_metrics_clamped() {
        let m = TextMetrics::new(150.0, 1.5, 9.0, -0.3);
        assert_eq!(m.perplexity.value(), 100.0);
        assert_eq!(m.burstiness.value(), 1.0);
        assert_eq!(m.entropy, MAX_ENTROPY);
        assert_eq!(m.repetitiveness.value(), 0.0);
    }

    #[test]
    fn test_request_kind() {
        assert_eq!(AnalysisRequest::text("hi").kind(), ContentKind::Text);
        let img = ImagePayload::new(vec![1], None);
        assert_eq!(AnalysisRequest::image(img).kind(), ContentKind::Image);
    }
}
