//! Companion debug endpoint
//!
//! A detached client (a browser, or any process that cannot read the
//! generated files itself) POSTs its caught error here; the endpoint
//! rebuilds the caught-error bundle from the forwarded augmented trace and
//! runs the same extraction pipeline server-side.

use crate::assemble::Contextualizer;
use crate::capture::{CaughtError, ErrorReport};
use crate::config::ContextualizeOptions;
use crate::error::ServerError;
use crate::frame::AugmentedStackTrace;
use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// The forwarded error: its report plus the client-captured trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorData {
    #[serde(flatten)]
    pub report: ErrorReport,
    #[serde(default)]
    pub augmented_trace: Option<AugmentedStackTrace>,
}

impl ErrorData {
    #[must_use]
    pub fn into_caught(self) -> CaughtError {
        CaughtError {
            report: self.report,
            trace: self.augmented_trace,
        }
    }
}

/// Body of `POST /contextualize`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandOffBody {
    #[serde(default)]
    pub error_data: Option<ErrorData>,
    #[serde(default)]
    pub options: Option<ContextualizeOptions>,
}

/// Build the companion router.
#[must_use]
pub fn router(contextualizer: Arc<Contextualizer>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/contextualize", post(contextualize))
        .with_state(contextualizer)
}

async fn health() -> &'static str {
    "OK"
}

async fn contextualize(
    State(contextualizer): State<Arc<Contextualizer>>,
    Json(body): Json<HandOffBody>,
) -> (StatusCode, Json<serde_json::Value>) {
    let Some(error_data) = body.error_data else {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "Missing error data." })));
    };

    let caught = error_data.into_caught();
    let options = body.options.unwrap_or_default();

    match contextualizer.contextualize_error(&caught, &options).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "Contextualized error data saved." })),
        ),
        Err(err) => {
            tracing::error!(error = %err, "failed to contextualize forwarded error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to contextualize error." })),
            )
        }
    }
}

/// Bind the companion endpoint and serve until shutdown.
pub async fn serve(contextualizer: Arc<Contextualizer>, port: u16) -> Result<(), ServerError> {
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .map_err(|source| ServerError::Bind { port, source })?;

    tracing::info!(port, "companion debug endpoint listening");
    axum::serve(listener, router(contextualizer))
        .await
        .map_err(ServerError::Serve)
}
