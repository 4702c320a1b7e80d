//! Provider-backed text analysis.

use tracing::debug;

use super::replies::TextReply;
use super::{AnalysisError, GatewayOptions};
use crate::extract;
use crate::model::{AnalysisResult, ContentKind};
use crate::prompts;
use crate::provider::{CompletionRequest, ProviderSet};
use crate::score::Percent;

/// Call the text provider and normalize its reply.
pub(super) async fn analyze(
    providers: &ProviderSet,
    options: &GatewayOptions,
    text: &str,
) -> Result<AnalysisResult, AnalysisError> {
    let request = CompletionRequest::new(prompts::text_analysis(text))
        .with_temperature(options.text_temperature)
        .json();

    debug!(chars = text.chars().count(), provider = providers.text.name(), "analyzing text");
    let raw = providers.text.complete(request).await?;

    let reply: TextReply = extract::decode(&raw).map_err(AnalysisError::Parse)?;
    Ok(normalize(reply))
}

fn normalize(reply: TextReply) -> AnalysisResult {
    AnalysisResult {
        kind: ContentKind::Text,
        ai_probability: Percent::new(reply.ai_probability),
        confidence: Percent::new(reply.confidence),
        findings: reply.indicators.into_iter().map(Into::into).collect(),
        attribution: reply.model_detection.into(),
        explanation: reply.explanation,
        metrics: Some(reply.metrics.into()),
        heatmap: None,
        comparison: None,
    }
}
