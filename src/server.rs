//! HTTP surface for the analysis gateway.
//!
//! Routes:
//! - `POST /analyze-text`   JSON `{ "text": string }`
//! - `POST /analyze-image`  multipart `image` (required), `originalImage` (optional)
//! - `GET  /health`
//!
//! Validation failures are 400s. Provider trouble never surfaces as an error
//! status; the body is tagged `"source": "fallback"` instead. Malformed
//! request bodies are 500s with a generic message, details go to the log.
//! Bodies over the upload limit are 413s. Every error body is `{ "error": ... }`.

use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::BytesRejection,
        DefaultBodyLimit, Multipart, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::gateway::{AnalysisError, Gateway, Outcome};
use crate::model::{AnalysisRequest, ContentKind, ImagePayload};
use crate::report::{self, JsonError};

/// Generic message for unexpected failures on the text route.
pub const TEXT_FAILED: &str = "Failed to analyze text";
/// Generic message for unexpected failures on the image route.
pub const IMAGE_FAILED: &str = "Failed to analyze image";

/// Message for bodies over `server.max_upload_bytes`.
pub const BODY_TOO_LARGE: &str = "Request body too large";

/// Multipart field carrying the suspect image.
pub const IMAGE_FIELD: &str = "image";
/// Multipart field carrying the optional reference image.
pub const ORIGINAL_IMAGE_FIELD: &str = "originalImage";

/// Build the application router.
pub fn router(gateway: Arc<Gateway>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/analyze-text", post(analyze_text))
        .route("/analyze-image", post(analyze_image))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(gateway)
}

/// Bind and serve until interrupted.
pub async fn serve(config: &Config, bind: Option<&str>) -> anyhow::Result<()> {
    let gateway = Arc::new(Gateway::from_config(config)?);
    let bind = bind.unwrap_or(&config.server.bind);
    let addr: SocketAddr = bind
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid bind address {:?}: {}", bind, e))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, router(gateway, config.server.max_upload_bytes))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

#[derive(Deserialize)]
struct TextBody {
    #[serde(default)]
    text: Option<String>,
}

async fn analyze_text(
    State(gateway): State<Arc<Gateway>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            return rejected(ContentKind::Text, rejection.status(), rejection.body_text());
        }
    };
    let body: TextBody = match serde_json::from_slice(&body) {
        Ok(body) => body,
        Err(e) => {
            let err = AnalysisError::Internal(format!("malformed body: {}", e));
            return failure(ContentKind::Text, err);
        }
    };

    let request = AnalysisRequest::text(body.text.unwrap_or_default());
    let outcome = gateway.analyze_text(&request).await;
    respond(ContentKind::Text, outcome)
}

async fn analyze_image(
    State(gateway): State<Arc<Gateway>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let form = match multipart {
        Ok(multipart) => read_image_form(multipart).await,
        Err(rejection) => {
            return rejected(ContentKind::Image, rejection.status(), rejection.body_text());
        }
    };
    let (image, original) = match form {
        Ok(parts) => parts,
        Err(e) => {
            return rejected(ContentKind::Image, e.status(), format!("multipart: {}", e));
        }
    };

    // A missing image becomes an empty payload so the gateway owns validation
    let image = image.unwrap_or_else(|| ImagePayload::new(Vec::new(), None));
    let mut request = AnalysisRequest::image(image);
    if let Some(original) = original {
        request = request.with_reference(original);
    }

    let outcome = gateway.analyze_image(&request).await;
    respond(ContentKind::Image, outcome)
}

/// Pull the `image` and `originalImage` parts out of a form. Other parts are skipped.
async fn read_image_form(
    mut multipart: Multipart,
) -> Result<(Option<ImagePayload>, Option<ImagePayload>), MultipartError> {
    let mut image = None;
    let mut original = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let slot = match name.as_str() {
            IMAGE_FIELD => &mut image,
            ORIGINAL_IMAGE_FIELD => &mut original,
            _ => continue,
        };
        let bytes = field.bytes().await?;
        *slot = Some(ImagePayload::new(bytes.to_vec(), content_type));
    }

    Ok((image, original))
}

fn respond(kind: ContentKind, outcome: Outcome) -> Response {
    let (result, reason) = match &outcome {
        Outcome::ValidationFailed(message) => {
            let err = AnalysisError::Validation(message.clone());
            info!(%kind, error = %err, "rejected request");
            return (StatusCode::BAD_REQUEST, Json(JsonError::new(err.to_string()))).into_response();
        }
        Outcome::Success(result) => (result, None),
        Outcome::Fallback { result, reason } => (result, Some(reason)),
    };

    info!(
        %kind,
        source = if reason.is_some() { report::SOURCE_FALLBACK } else { report::SOURCE_PROVIDER },
        ai_probability = result.ai_probability.value(),
        "analysis complete"
    );

    match report::to_json_value(result, reason) {
        Ok(value) => (StatusCode::OK, Json(value)).into_response(),
        Err(e) => failure(kind, AnalysisError::Internal(format!("serialize result: {}", e))),
    }
}

/// Answer a body the extractors refused. Oversized bodies keep their 413,
/// everything else is a generic 500.
fn rejected(kind: ContentKind, status: StatusCode, detail: String) -> Response {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        warn!(%kind, error = %detail, "request body over limit");
        return (status, Json(JsonError::new(BODY_TOO_LARGE))).into_response();
    }
    failure(kind, AnalysisError::Internal(detail))
}

/// A 500 with a generic message. The detail only goes to the log.
fn failure(kind: ContentKind, err: AnalysisError) -> Response {
    error!(%kind, category = err.kind(), error = %err, "request failed");
    let message = match kind {
        ContentKind::Text => TEXT_FAILED,
        ContentKind::Image => IMAGE_FAILED,
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(JsonError::new(message))).into_response()
}
