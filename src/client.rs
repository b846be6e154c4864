//! Detached-client hand-off
//!
//! Best-effort forwarding of a caught error to the companion endpoint when
//! the catching process cannot (or should not) read source files itself.

use crate::capture::CaughtError;
use crate::config::ContextualizeOptions;
use crate::error::ContextError;
use crate::server::{ErrorData, HandOffBody};

/// POST a caught error to `<server_url>/contextualize`.
pub async fn forward_error(
    server_url: &str,
    caught: &CaughtError,
    options: &ContextualizeOptions,
) -> Result<(), ContextError> {
    let body = HandOffBody {
        error_data: Some(ErrorData {
            report: caught.report.clone(),
            augmented_trace: caught.trace.clone(),
        }),
        options: Some(options.clone()),
    };

    let response = reqwest::Client::new()
        .post(format!("{server_url}/contextualize"))
        .json(&body)
        .send()
        .await?;
    response.error_for_status()?;

    tracing::debug!(server_url = %server_url, "forwarded error to companion endpoint");
    Ok(())
}
