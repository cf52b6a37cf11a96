//! Error types for the HTTP transport adapters.

use mesos_apierrors::{ApiError, AsApiError};

/// Errors produced while calling a Mesos HTTP v1 endpoint.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Mesos answered with an error status.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// HTTP transport error; no response was received.
    #[error("HTTP error: {context}: {source}")]
    Http {
        /// Human-readable context.
        context: &'static str,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
}

impl ClientError {
    /// Returns `true` if Mesos reported a temporary condition.
    ///
    /// Transport failures are never classified as temporary here; the
    /// caller's retry policy decides what to do with them.
    #[must_use]
    pub fn temporary(&self) -> bool {
        self.as_api_error().is_some_and(ApiError::temporary)
    }

    /// Returns `true` if Mesos reported that the event subscription is gone.
    #[must_use]
    pub fn subscription_loss(&self) -> bool {
        self.as_api_error().is_some_and(ApiError::subscription_loss)
    }
}

impl AsApiError for ClientError {
    fn as_api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(err) => Some(err),
            Self::Http { .. } => None,
        }
    }
}
