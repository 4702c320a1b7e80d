//! Provider-backed image analysis.
//!
//! Calls run strictly in sequence: classify the image, classify the
//! reference (if any), then ask the vision model for artifacts. Any error
//! abandons everything gathered so far.

use tracing::debug;

use super::replies::ForensicsReply;
use super::{AnalysisError, GatewayOptions};
use crate::extract;
use crate::model::{AnalysisResult, ContentKind, ImagePayload, ModelAttribution};
use crate::prompts;
use crate::provider::{CompletionRequest, ProviderSet};
use crate::score::Percent;
use crate::synthetic;

pub(super) async fn analyze(
    providers: &ProviderSet,
    options: &GatewayOptions,
    image: &ImagePayload,
    reference: Option<&ImagePayload>,
) -> Result<AnalysisResult, AnalysisError> {
    let data_uri = image.to_data_uri();

    let ai_probability = classify(providers, &data_uri).await?;
    debug!(probability = ai_probability.value(), "classified image");

    let reference_probability = match reference {
        Some(reference) => {
            let p = classify(providers, &reference.to_data_uri()).await?;
            debug!(probability = p.value(), "classified reference image");
            Some(p)
        }
        None => None,
    };

    let request = CompletionRequest::new(prompts::image_forensics(ai_probability))
        .with_image(data_uri)
        .json();
    let raw = providers.vision.complete(request).await?;
    let reply: ForensicsReply = extract::decode(&raw).map_err(AnalysisError::Parse)?;

    // No awaits past this point
    let mut rng = rand::thread_rng();
    let comparison = reference_probability.map(|p| {
        Box::new(AnalysisResult {
            kind: ContentKind::Image,
            ai_probability: p,
            confidence: synthetic::image_confidence(&mut rng),
            findings: Vec::new(),
            attribution: ModelAttribution::unknown(),
            explanation: None,
            metrics: None,
            heatmap: None,
            comparison: None,
        })
    });

    Ok(AnalysisResult {
        kind: ContentKind::Image,
        ai_probability,
        confidence: synthetic::image_confidence(&mut rng),
        findings: reply.detected_artifacts.into_iter().map(Into::into).collect(),
        attribution: reply.model_detection.into(),
        explanation: reply.analysis_explanation,
        metrics: None,
        heatmap: Some(options.heatmap.clone()),
        comparison,
    })
}

/// Run the classifier and recover a percentage from its reply.
async fn classify(providers: &ProviderSet, data_uri: &str) -> Result<Percent, AnalysisError> {
    let raw = providers.classifier.classify(data_uri).await?;
    Ok(classifier_percent(extract::probability(&raw)))
}

/// Scale a classifier probability to `[0, 100]`.
///
/// Values in `[0, 1]` are fractions. Values above 1 and up to 100 are
/// taken to already be percentages.
pub(crate) fn classifier_percent(raw: f64) -> Percent {
    if raw > 1.0 && raw <= 100.0 {
        Percent::new(raw)
    } else {
        Percent::from_fraction(raw)
    }
}
