//! Synthetic results used when the provider path fails.
//!
//! Values are drawn from the caller's RNG so tests can seed it; the gateway
//! passes the thread-local RNG. Every value lands inside its documented range.

use rand::Rng;

use crate::model::{AnalysisResult, ArtifactFinding, ContentKind, ModelAttribution, TextMetrics};
use crate::score::Percent;

/// Explanation attached to every synthetic result.
pub const FALLBACK_EXPLANATION: &str = "API call failed. This is mock data.";

const TEXT_INDICATORS: &[&str] = &[
    "Repetitive phrases",
    "Unnatural phrasing",
    "Consistent tone",
    "Lack of personal anecdotes",
    "Generic examples",
];

const TEXT_MODELS: [&str; 2] = ["GPT-4", "Claude"];
const IMAGE_MODELS: [&str; 2] = ["Stable Diffusion", "DALL-E"];

const IMAGE_ARTIFACTS: &[(&str, &str)] = &[
    (
        "Facial inconsistencies",
        "Unnatural facial features, asymmetry, or blending issues often found in AI-generated faces.",
    ),
    (
        "Unnatural lighting",
        "Inconsistent light sources, shadows, or reflections that don't match the scene physics.",
    ),
    (
        "Background anomalies",
        "Unusual patterns, repetitions, or distortions in the background elements.",
    ),
    (
        "Texture irregularities",
        "Abnormal smoothness, noise patterns, or detail inconsistencies in textures.",
    ),
];

/// Confidence attached to image results, in `[90, 100)`.
pub fn image_confidence<R: Rng>(rng: &mut R) -> Percent {
    Percent::new(rng.gen_range(90.0..100.0))
}

fn pick<'a, R: Rng>(rng: &mut R, options: [&'a str; 2]) -> &'a str {
    if rng.gen_bool(0.5) {
        options[0]
    } else {
        options[1]
    }
}

/// A complete synthetic text result.
pub fn text_result<R: Rng>(rng: &mut R) -> AnalysisResult {
    let findings = TEXT_INDICATORS
        .iter()
        .map(|name| ArtifactFinding::new(*name, "", rng.gen_range(0.0..100.0)))
        .collect();

    let metrics = TextMetrics::new(
        rng.gen_range(45.0..75.0),
        rng.gen_range(0.3..0.8),
        rng.gen_range(3.5..5.0),
        rng.gen_range(0.1..0.4),
    );

    AnalysisResult {
        kind: ContentKind::Text,
        ai_probability: Percent::new(rng.gen_range(0.0..100.0)),
        confidence: Percent::new(rng.gen_range(85.0..100.0)),
        findings,
        attribution: ModelAttribution::new(pick(rng, TEXT_MODELS), rng.gen_range(75.0..100.0)),
        explanation: Some(FALLBACK_EXPLANATION.to_string()),
        metrics: Some(metrics),
        heatmap: None,
        comparison: None,
    }
}

/// A complete synthetic image result, with a synthetic comparison when
/// `with_reference` is set.
pub fn image_result<R: Rng>(
    rng: &mut R,
    heatmap: &str,
    with_reference: bool,
) -> AnalysisResult {
    let findings = IMAGE_ARTIFACTS
        .iter()
        .map(|(name, description)| {
            ArtifactFinding::new(*name, *description, rng.gen_range(20.0..100.0))
        })
        .collect();

    let comparison = if with_reference {
        Some(Box::new(image_result(rng, heatmap, false)))
    } else {
        None
    };

    AnalysisResult {
        kind: ContentKind::Image,
        ai_probability: Percent::new(rng.gen_range(0.0..100.0)),
        confidence: image_confidence(rng),
        findings,
        attribution: ModelAttribution::new(pick(rng, IMAGE_MODELS), rng.gen_range(75.0..100.0)),
        explanation: Some(FALLBACK_EXPLANATION.to_string()),
        metrics: None,
        heatmap: Some(heatmap.to_string()),
        comparison,
    }
}
