//! Prompt templates sent to completion providers.

use crate::score::Percent;

const TEXT_ANALYSIS_TEMPLATE: &str = r#"You are an expert AI content detector with advanced linguistic analysis capabilities. Analyze the following text and determine if it was written by AI or a human.

Analyze these specific aspects:
1. Perplexity: How predictable is the text? AI tends to be more predictable.
2. Burstiness: Do sentence lengths and structures vary naturally? Humans tend to be more "bursty".
3. Entropy: How random or information-dense is the text?
4. Repetitiveness: Does the text repeat phrases or patterns?
5. Linguistic patterns: Are there unnatural phrasings or consistent tone?
6. Personal elements: Does it contain personal anecdotes or unique perspectives?

Based on your analysis, identify which AI model likely generated the text if applicable.

Respond with a single JSON object and nothing else, using this structure:
{
  "aiProbability": number between 0-100,
  "humanProbability": number between 0-100,
  "confidence": number between 0-100,
  "metrics": {
    "perplexity": number between 0-100 (lower suggests AI),
    "burstiness": number between 0-1 (higher suggests human),
    "entropy": number between 0-5 (higher suggests human),
    "repetitiveness": number between 0-1 (higher suggests AI)
  },
  "indicators": [
    { "name": string, "score": number between 0-100 }
  ],
  "modelDetection": {
    "detectedModel": string,
    "probability": number between 0-100
  },
  "explanation": string with brief analysis explanation
}

Text to analyze: "#;

const IMAGE_FORENSICS_TEMPLATE: &str = r#"You are an expert in deepfake detection and image forensics. Analyze the attached image and identify specific artifacts or inconsistencies that might indicate it's AI-generated or manipulated.

Focus on:
1. Facial inconsistencies (eyes, teeth, ears)
2. Unnatural lighting and shadows
3. Background anomalies
4. Texture irregularities
5. Unusual blending or boundaries

The deepfake detection model gave this image a fake probability of {probability}%.

Respond with a single JSON object and nothing else, using this structure:
{
  "detectedArtifacts": [
    { "name": string, "description": string, "score": number between 0-100 }
  ],
  "modelDetection": {
    "detectedModel": string (likely model that generated this if AI-generated),
    "probability": number between 0-100
  },
  "analysisExplanation": string with detailed explanation
}"#;

/// Prompt asking a language model to score `text`.
pub fn text_analysis(text: &str) -> String {
    format!("{}{}", TEXT_ANALYSIS_TEMPLATE, text)
}

/// Prompt asking a vision model to describe artifacts, given the
/// classifier's probability.
pub fn image_forensics(classifier_probability: Percent) -> String {
    IMAGE_FORENSICS_TEMPLATE.replace(
        "{probability}",
        &format!("{:.1}", classifier_probability.value()),
    )
}
