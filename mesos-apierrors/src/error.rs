//! Classified Mesos API errors.

use crate::code::Code;
use crate::subscription;

/// An error generated by Mesos for an HTTP v1 API call.
///
/// Displays as the canned message for its code, optionally followed by
/// `": "` and details captured from the response body.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    code: Code,
    message: String,
}

impl ApiError {
    /// Builds an error for `code` whatever its value, appending `details` to
    /// the canned message when non-empty.
    ///
    /// Prefer [`Code::error`], which refuses non-error codes. Codes missing
    /// from [`ERROR_TABLE`](crate::ERROR_TABLE) get an empty base message.
    #[must_use]
    pub fn with_details(code: Code, details: &str) -> Self {
        let mut message = code.message().unwrap_or_default().to_owned();
        if !details.is_empty() {
            message.push_str(": ");
            message.push_str(details);
        }
        Self { code, message }
    }

    /// Returns the response status code that produced this error.
    #[must_use]
    pub const fn code(&self) -> Code {
        self.code
    }

    /// Returns the full error message, including captured details.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the classification of this error's code.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        ErrorKind::of(self.code)
    }

    /// Returns `true` if the error is a temporary condition that should
    /// eventually clear.
    ///
    /// [`ErrorKind::NotFound`] is not temporary even though it can be caused
    /// by a startup race in libprocess: it is indistinguishable from a call
    /// to an invalid endpoint.
    #[must_use]
    pub const fn temporary(&self) -> bool {
        match self.kind() {
            ErrorKind::RateLimitExceeded | ErrorKind::Unavailable => true,
            ErrorKind::NotLeader
            | ErrorKind::NotAuthenticated
            | ErrorKind::Unsubscribed
            | ErrorKind::IncompatibleVersion
            | ErrorKind::MalformedRequest
            | ErrorKind::UnsupportedMediaType
            | ErrorKind::NotFound
            | ErrorKind::Unrecognized(_) => false,
        }
    }

    /// Returns `true` if the error indicates that the event subscription
    /// stream between Mesos and the client has been severed.
    ///
    /// Consults the process-wide set maintained by
    /// [`add_subscription_loss_code`](crate::subscription::add_subscription_loss_code).
    #[must_use]
    pub fn subscription_loss(&self) -> bool {
        subscription::is_subscription_loss_code(self.code)
    }
}

/// The class of condition reported by an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The call reached a non-leading master.
    NotLeader,
    /// The call was not authenticated.
    NotAuthenticated,
    /// No subscription has been established.
    Unsubscribed,
    /// The API version is incompatible.
    IncompatibleVersion,
    /// The call was malformed.
    MalformedRequest,
    /// The media type is unsupported.
    UnsupportedMediaType,
    /// The call was rate limited.
    RateLimitExceeded,
    /// The master or agent is unavailable.
    Unavailable,
    /// The HTTP endpoint was not found.
    NotFound,
    /// An error code without a canned message.
    Unrecognized(Code),
}

impl ErrorKind {
    /// Classifies a status code.
    #[must_use]
    pub const fn of(code: Code) -> Self {
        match code {
            Code::NOT_LEADER => Self::NotLeader,
            Code::NOT_AUTHENTICATED => Self::NotAuthenticated,
            Code::UNSUBSCRIBED => Self::Unsubscribed,
            Code::INCOMPATIBLE_VERSION => Self::IncompatibleVersion,
            Code::MALFORMED_REQUEST => Self::MalformedRequest,
            Code::UNSUPPORTED_MEDIA_TYPE => Self::UnsupportedMediaType,
            Code::RATE_LIMIT_EXCEEDED => Self::RateLimitExceeded,
            Code::MESOS_UNAVAILABLE => Self::Unavailable,
            Code::NOT_FOUND => Self::NotFound,
            other => Self::Unrecognized(other),
        }
    }
}

/// Access to an [`ApiError`] carried inside a caller's error type.
///
/// Implement this for error enums that wrap [`ApiError`] next to unrelated
/// failures so that [`Code::matches`] can tell them apart.
pub trait AsApiError {
    /// Returns the wrapped API error, if this error is one.
    fn as_api_error(&self) -> Option<&ApiError>;
}

impl AsApiError for ApiError {
    fn as_api_error(&self) -> Option<&ApiError> {
        Some(self)
    }
}

impl<T: AsApiError + ?Sized> AsApiError for Box<T> {
    fn as_api_error(&self) -> Option<&ApiError> {
        (**self).as_api_error()
    }
}
