//! Integration tests for the analysis gateway.
//!
//! These drive the full pipelines against scripted providers and check the
//! result invariants on both the provider-backed and fallback paths.

use std::sync::Arc;

use authentiscan::gateway::{AnalysisError, Gateway, GatewayOptions, Outcome};
use authentiscan::model::{AnalysisRequest, ContentKind, ImagePayload};
use authentiscan::provider::{ProviderSet, ScriptedProvider};
use authentiscan::synthetic::FALLBACK_EXPLANATION;

const TEXT_REPLY: &str = r#"```json
{
  "aiProbability": 82.5,
  "humanProbability": 17.5,
  "confidence": 91,
  "metrics": {"perplexity": 32, "burstiness": 0.21, "entropy": 3.9, "repetitiveness": 0.44},
  "indicators": [
    {"name": "Consistent tone", "score": 87},
    {"name": "Generic examples", "score": 64}
  ],
  "modelDetection": {"detectedModel": "GPT-4", "probability": 78},
  "explanation": "Low burstiness and uniform tone."
}
```"#;

const FORENSICS_REPLY: &str = r#"{
  "detectedArtifacts": [
    {"name": "Unnatural lighting", "description": "Shadows fall in two directions.", "score": 71},
    {"name": "Texture irregularities", "description": "Skin is overly smooth.", "score": 64}
  ],
  "modelDetection": {"detectedModel": "Midjourney", "probability": 66},
  "analysisExplanation": "Several generation artifacts are present."
}"#;

struct Harness {
    gateway: Gateway,
    text: Arc<ScriptedProvider>,
    vision: Arc<ScriptedProvider>,
    classifier: Arc<ScriptedProvider>,
}

fn harness(text: ScriptedProvider, vision: ScriptedProvider, classifier: ScriptedProvider) -> Harness {
    let text = Arc::new(text);
    let vision = Arc::new(vision);
    let classifier = Arc::new(classifier);
    let providers = ProviderSet {
        text: text.clone(),
        vision: vision.clone(),
        classifier: classifier.clone(),
    };
    Harness {
        gateway: Gateway::new(providers, GatewayOptions::default()),
        text,
        vision,
        classifier,
    }
}

fn png(bytes: &[u8]) -> ImagePayload {
    let mut data = vec![0x89, b'P', b'N', b'G'];
    data.extend_from_slice(bytes);
    ImagePayload::new(data, None)
}

fn assert_invariants(outcome: &Outcome) {
    let result = outcome.result().expect("outcome should carry a result");
    let ai = result.ai_probability.value();
    assert!((0.0..=100.0).contains(&ai));
    assert!((ai + result.complementary_probability().value() - 100.0).abs() < 1e-9);
    assert!((0.0..=100.0).contains(&result.confidence.value()));
    for finding in &result.findings {
        assert!((0.0..=100.0).contains(&finding.score.value()));
    }
    if let Some(m) = &result.metrics {
        assert!((0.0..=100.0).contains(&m.perplexity.value()));
        assert!((0.0..=1.0).contains(&m.burstiness.value()));
        assert!((0.0..=5.0).contains(&m.entropy));
        assert!((0.0..=1.0).contains(&m.repetitiveness.value()));
    }
}

#[tokio::test]
async fn test_text_success_from_fenced_reply() {
    let h = harness(
        ScriptedProvider::new(TEXT_REPLY),
        ScriptedProvider::failing(),
        ScriptedProvider::failing(),
    );
    let request = AnalysisRequest::text("The quick brown fox jumps over the lazy dog.");
    let outcome = h.gateway.analyze_text(&request).await;

    assert!(matches!(outcome, Outcome::Success(_)));
    assert_invariants(&outcome);
    let result = outcome.result().unwrap();
    assert_eq!(result.kind, ContentKind::Text);
    assert_eq!(result.ai_probability.value(), 82.5);
    assert_eq!(result.complementary_probability().value(), 17.5);
    assert_eq!(result.findings.len(), 2);
    assert_eq!(result.attribution.detected_model, "GPT-4");
    assert_eq!(result.explanation.as_deref(), Some("Low burstiness and uniform tone."));
    assert_eq!(h.text.call_count(), 1);
    assert!(h.text.prompts()[0].ends_with("The quick brown fox jumps over the lazy dog."));
}

#[tokio::test]
async fn test_blank_text_is_rejected_without_calls() {
    let h = harness(
        ScriptedProvider::new(TEXT_REPLY),
        ScriptedProvider::failing(),
        ScriptedProvider::failing(),
    );
    for text in ["", "   ", "\n\t "] {
        let outcome = h.gateway.analyze_text(&AnalysisRequest::text(text)).await;
        match outcome {
            Outcome::ValidationFailed(message) => assert_eq!(message, "Text is required"),
            other => panic!("expected validation failure, got {:?}", other),
        }
    }
    assert_eq!(h.text.call_count(), 0);
}

#[tokio::test]
async fn test_text_provider_failure_falls_back() {
    let h = harness(
        ScriptedProvider::failing(),
        ScriptedProvider::failing(),
        ScriptedProvider::failing(),
    );
    let outcome = h.gateway.analyze_text(&AnalysisRequest::text("Some prose.")).await;

    assert!(outcome.is_fallback());
    assert!(matches!(outcome.fallback_reason(), Some(AnalysisError::Provider(_))));
    assert_invariants(&outcome);
    let result = outcome.result().unwrap();
    assert_eq!(result.explanation.as_deref(), Some(FALLBACK_EXPLANATION));
    assert!(result.metrics.is_some());
    assert_eq!(h.text.call_count(), 1);
}

#[tokio::test]
async fn test_text_malformed_reply_falls_back() {
    let h = harness(
        ScriptedProvider::new("I think this text is probably written by a person."),
        ScriptedProvider::failing(),
        ScriptedProvider::failing(),
    );
    let outcome = h.gateway.analyze_text(&AnalysisRequest::text("Some prose.")).await;

    assert!(matches!(outcome.fallback_reason(), Some(AnalysisError::Parse(_))));
    assert_invariants(&outcome);
}

#[tokio::test]
async fn test_text_out_of_range_reply_is_clamped() {
    let reply = r#"{
        "aiProbability": 130, "confidence": 101,
        "metrics": {"perplexity": -4, "burstiness": 3, "entropy": 12, "repetitiveness": 0.5},
        "modelDetection": {"detectedModel": "Claude", "probability": 500}
    }"#;
    let h = harness(
        ScriptedProvider::new(reply),
        ScriptedProvider::failing(),
        ScriptedProvider::failing(),
    );
    let outcome = h.gateway.analyze_text(&AnalysisRequest::text("Some prose.")).await;

    assert!(matches!(outcome, Outcome::Success(_)));
    assert_invariants(&outcome);
    let result = outcome.result().unwrap();
    assert_eq!(result.ai_probability.value(), 100.0);
    assert_eq!(result.attribution.probability.value(), 100.0);
}

#[tokio::test]
async fn test_missing_image_is_rejected_without_calls() {
    let h = harness(
        ScriptedProvider::failing(),
        ScriptedProvider::new(FORENSICS_REPLY),
        ScriptedProvider::new("0.9"),
    );
    let request = AnalysisRequest::image(ImagePayload::new(Vec::new(), None));
    match h.gateway.analyze_image(&request).await {
        Outcome::ValidationFailed(message) => assert_eq!(message, "Image is required"),
        other => panic!("expected validation failure, got {:?}", other),
    }
    assert_eq!(h.classifier.call_count(), 0);
    assert_eq!(h.vision.call_count(), 0);
}

#[tokio::test]
async fn test_image_success_with_salvaged_probability() {
    let h = harness(
        ScriptedProvider::failing(),
        ScriptedProvider::new(FORENSICS_REPLY),
        ScriptedProvider::new("probability: 0.73 detected"),
    );
    let outcome = h.gateway.analyze_image(&AnalysisRequest::image(png(b"img"))).await;

    assert!(matches!(outcome, Outcome::Success(_)));
    assert_invariants(&outcome);
    let result = outcome.result().unwrap();
    assert_eq!(result.kind, ContentKind::Image);
    assert!((result.ai_probability.value() - 73.0).abs() < 1e-9);
    assert!(result.confidence.value() >= 90.0 && result.confidence.value() < 100.0);
    assert_eq!(result.findings.len(), 2);
    assert_eq!(result.attribution.detected_model, "Midjourney");
    assert_eq!(result.heatmap.as_deref(), Some(authentiscan::config::DEFAULT_HEATMAP));
    assert!(result.comparison.is_none());

    assert_eq!(h.classifier.call_count(), 1);
    assert!(h.classifier.prompts()[0].starts_with("data:image/png;base64,"));
    assert_eq!(h.vision.call_count(), 1);
    assert!(h.vision.prompts()[0].contains("fake probability of 73.0%"));
}

#[tokio::test]
async fn test_image_classifier_without_number_defaults_to_half() {
    let h = harness(
        ScriptedProvider::failing(),
        ScriptedProvider::new(FORENSICS_REPLY),
        ScriptedProvider::new("looks fake to me"),
    );
    let outcome = h.gateway.analyze_image(&AnalysisRequest::image(png(b"img"))).await;

    assert!(matches!(outcome, Outcome::Success(_)));
    assert_eq!(outcome.result().unwrap().ai_probability.value(), 50.0);
}

#[tokio::test]
async fn test_image_with_reference_populates_comparison() {
    let h = harness(
        ScriptedProvider::failing(),
        ScriptedProvider::new(FORENSICS_REPLY),
        ScriptedProvider::new("unused")
            .then_reply(r#"{"fake_probability": 0.92}"#)
            .then_reply(r#"{"fake_probability": 0.08}"#),
    );
    let request = AnalysisRequest::image(png(b"suspect")).with_reference(png(b"original"));
    let outcome = h.gateway.analyze_image(&request).await;

    assert!(matches!(outcome, Outcome::Success(_)));
    let result = outcome.result().unwrap();
    assert!((result.ai_probability.value() - 92.0).abs() < 1e-9);
    let comparison = result.comparison.as_ref().expect("comparison should be present");
    assert!((comparison.ai_probability.value() - 8.0).abs() < 1e-9);
    assert!(comparison.confidence.value() >= 90.0);

    // classify suspect, classify reference, then one vision call
    assert_eq!(h.classifier.call_count(), 2);
    assert_eq!(h.vision.call_count(), 1);
}

#[tokio::test]
async fn test_image_comparison_falls_back_when_providers_fail() {
    let h = harness(
        ScriptedProvider::failing(),
        ScriptedProvider::failing(),
        ScriptedProvider::failing(),
    );
    let request = AnalysisRequest::image(png(b"suspect")).with_reference(png(b"original"));
    let outcome = h.gateway.analyze_image(&request).await;

    assert!(outcome.is_fallback());
    assert_invariants(&outcome);
    let result = outcome.result().unwrap();
    assert_eq!(result.explanation.as_deref(), Some(FALLBACK_EXPLANATION));
    assert!(result.comparison.is_some(), "comparison must not be omitted");
    assert_eq!(h.classifier.call_count(), 1);
    assert_eq!(h.vision.call_count(), 0);
}

#[tokio::test]
async fn test_image_malformed_vision_reply_discards_partial_results() {
    let h = harness(
        ScriptedProvider::failing(),
        ScriptedProvider::new("The image looks edited."),
        ScriptedProvider::new("0.99"),
    );
    let outcome = h.gateway.analyze_image(&AnalysisRequest::image(png(b"img"))).await;

    assert!(matches!(outcome.fallback_reason(), Some(AnalysisError::Parse(_))));
    let result = outcome.result().unwrap();
    assert_eq!(result.findings.len(), 4);
    assert_eq!(result.explanation.as_deref(), Some(FALLBACK_EXPLANATION));
}

#[tokio::test]
async fn test_analyze_dispatches_on_kind() {
    let h = harness(
        ScriptedProvider::new(TEXT_REPLY),
        ScriptedProvider::new(FORENSICS_REPLY),
        ScriptedProvider::new("0.4"),
    );
    let text = h.gateway.analyze(&AnalysisRequest::text("Words.")).await;
    assert_eq!(text.result().unwrap().kind, ContentKind::Text);

    let image = h.gateway.analyze(&AnalysisRequest::image(png(b"x"))).await;
    assert_eq!(image.result().unwrap().kind, ContentKind::Image);
}
