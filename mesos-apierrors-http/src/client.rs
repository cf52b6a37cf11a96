//! Classification of `reqwest` responses.
//!
//! [`error_for_status`] is the entry point for transports that still need
//! the body of successful responses. [`from_response`] consumes the
//! response whatever its status, like
//! [`mesos_apierrors::from_response`] does for blocking bodies.
//!
//! Error bodies are streamed chunk by chunk and capture stops after
//! [`MAX_SIZE_DETAILS`] bytes; the rest of the body is never read.

use mesos_apierrors::response::details_from_bytes;
use mesos_apierrors::{ApiError, Code, MAX_SIZE_DETAILS};
use reqwest::{RequestBuilder, Response};

#[cfg(feature = "telemetry")]
use tracing::{debug, instrument};

use crate::error::ClientError;

/// Returns the response untouched if its status is not an error, otherwise
/// consumes it and returns the classified [`ApiError`].
///
/// # Errors
///
/// Returns an [`ApiError`] for any status code of 300 or above.
#[cfg_attr(
    feature = "telemetry",
    instrument(name = "mesos.apierrors.error_for_status", skip_all)
)]
pub async fn error_for_status(res: Response) -> Result<Response, ApiError> {
    let code = Code::from(res.status());
    if !code.is_error() {
        return Ok(res);
    }
    let details = read_details(res).await;

    #[cfg(feature = "telemetry")]
    debug!(
        code = code.as_u16(),
        details_len = details.len(),
        "Classified API error response"
    );

    Err(ApiError::with_details(code, &details))
}

/// Returns an [`ApiError`] for a response whose status code indicates an
/// error condition, with the start of the body as details.
///
/// The response is consumed and released for every status.
pub async fn from_response(res: Response) -> Option<ApiError> {
    error_for_status(res).await.err()
}

/// Sends a request and classifies the response.
///
/// `context` is a human-readable identifier used in error messages
/// (e.g. `"POST /api/v1/scheduler"`).
///
/// # Errors
///
/// Returns [`ClientError::Http`] if no response was received and
/// [`ClientError::Api`] if Mesos answered with an error status.
pub async fn send(request: RequestBuilder, context: &'static str) -> Result<Response, ClientError> {
    let res = request
        .send()
        .await
        .map_err(|source| ClientError::Http { context, source })?;
    Ok(error_for_status(res).await?)
}

/// Reads at most [`MAX_SIZE_DETAILS`] bytes of the response body.
///
/// A failing body stream ends the capture early and keeps the bytes
/// received so far.
pub async fn read_details(mut res: Response) -> String {
    let mut buf = Vec::new();
    while buf.len() < MAX_SIZE_DETAILS {
        match res.chunk().await {
            Ok(Some(chunk)) => {
                let take = chunk.len().min(MAX_SIZE_DETAILS - buf.len());
                buf.extend_from_slice(&chunk[..take]);
            }
            Ok(None) => break,
            Err(err) => {
                record_read_failure(&err, buf.len());
                break;
            }
        }
    }
    details_from_bytes(&buf)
}

#[cfg(feature = "telemetry")]
fn record_read_failure(err: &reqwest::Error, captured: usize) {
    debug!(error = %err, captured, "Failed to read response body details");
}

/// Noop if telemetry feature is off.
#[cfg(not(feature = "telemetry"))]
const fn record_read_failure(_err: &reqwest::Error, _captured: usize) {}
