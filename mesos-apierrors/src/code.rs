//! Mesos HTTP v1 API response status codes.
//!
//! A [`Code`] is a plain HTTP status reinterpreted as a Mesos API error
//! classifier. Well-known values are exposed as associated constants and
//! carry canned messages from [`ERROR_TABLE`].

use std::fmt;
use std::num::ParseIntError;

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, AsApiError};

/// Message for calls sent to a non-leading Mesos master.
pub const MSG_NOT_LEADER: &str = "call sent to a non-leading master";
/// Message for calls that are not successfully authenticated.
pub const MSG_AUTH: &str = "call not authenticated";
/// Message for calls sent before a subscription is established.
pub const MSG_UNSUBSCRIBED: &str = "no subscription established";
/// Message for calls sent to an incompatible API version.
pub const MSG_VERSION: &str = "incompatible API version";
/// Message for malformed calls.
pub const MSG_MALFORMED: &str = "malformed request";
/// Message for calls sent with an unsupported media type.
pub const MSG_MEDIA_TYPE: &str = "unsupported media type";
/// Message for rate limited calls. This condition should clear on its own.
pub const MSG_RATE_LIMIT: &str = "rate limited";
/// Message for calls sent to a master or agent that is recovering, or that
/// does not yet realize it is the leader. This condition should clear on its own.
pub const MSG_UNAVAILABLE: &str = "mesos server unavailable";
/// Message for calls sent before libprocess has set up its HTTP routes.
pub const MSG_NOT_FOUND: &str = "mesos http endpoint not found";

/// Upper bound, in bytes, on the response body captured as error details.
///
/// The cap applies to the bytes read from the body and to the decoded text.
/// Invalid UTF-8 decodes to 3-byte `U+FFFD` characters, so a body of invalid
/// bytes yields fewer characters than bytes read.
pub const MAX_SIZE_DETAILS: usize = 4 * 1024;

/// A Mesos HTTP v1 API response status code.
///
/// Serializes as a bare integer. Deserializes from an integer or from a
/// numeric string, so config values such as `"${LOSS_CODE}"` work once
/// expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "CodeRepr", into = "u16")]
pub struct Code(pub u16);

#[derive(Deserialize)]
#[serde(untagged)]
enum CodeRepr {
    Int(u16),
    Str(String),
}

impl TryFrom<CodeRepr> for Code {
    type Error = ParseIntError;

    fn try_from(value: CodeRepr) -> Result<Self, Self::Error> {
        match value {
            CodeRepr::Int(code) => Ok(Self(code)),
            CodeRepr::Str(text) => text.trim().parse().map(Self),
        }
    }
}

impl Code {
    /// `307 Temporary Redirect`: the call reached a non-leading master.
    pub const NOT_LEADER: Self = Self(307);
    /// `401 Unauthorized`.
    pub const NOT_AUTHENTICATED: Self = Self(401);
    /// `403 Forbidden`: no subscription has been established.
    pub const UNSUBSCRIBED: Self = Self(403);
    /// `409 Conflict`: the API version is incompatible.
    pub const INCOMPATIBLE_VERSION: Self = Self(409);
    /// `400 Bad Request`.
    pub const MALFORMED_REQUEST: Self = Self(400);
    /// `406 Not Acceptable`.
    pub const UNSUPPORTED_MEDIA_TYPE: Self = Self(406);
    /// `429 Too Many Requests`.
    pub const RATE_LIMIT_EXCEEDED: Self = Self(429);
    /// `503 Service Unavailable`.
    pub const MESOS_UNAVAILABLE: Self = Self(503);
    /// `404 Not Found`.
    pub const NOT_FOUND: Self = Self(404);

    /// Returns the raw status value.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Returns `true` for every status that is neither informational nor
    /// successful.
    ///
    /// 3xx codes count as errors: a temporary redirect means the call did not
    /// reach the leading master.
    #[must_use]
    pub const fn is_error(self) -> bool {
        self.0 >= 300
    }

    /// Returns the canned message for this code, or `None` for codes outside
    /// [`ERROR_TABLE`].
    #[must_use]
    pub fn message(self) -> Option<&'static str> {
        ERROR_TABLE
            .iter()
            .find(|(code, _)| *code == self)
            .map(|(_, msg)| *msg)
    }

    /// Builds an [`ApiError`] for this code, appending `details` to the
    /// canned message when non-empty.
    ///
    /// Returns `None` if the code is not an error code. Codes missing from
    /// [`ERROR_TABLE`] produce an error with an empty base message, so
    /// `Code(499).error("x")` displays as `": x"`.
    #[must_use]
    pub fn error(self, details: &str) -> Option<ApiError> {
        self.is_error().then(|| ApiError::with_details(self, details))
    }

    /// Returns `true` if `err` is an API error carrying exactly this code.
    ///
    /// A missing error matches any non-error code, i.e. "no error expected,
    /// none occurred". Errors that do not wrap an [`ApiError`] never match.
    #[must_use]
    pub fn matches<E>(self, err: Option<&E>) -> bool
    where
        E: AsApiError + ?Sized,
    {
        match err {
            None => !self.is_error(),
            Some(err) => err.as_api_error().is_some_and(|api| api.code() == self),
        }
    }
}

/// Maps well-known response codes to their Mesos v1 API error messages.
pub static ERROR_TABLE: &[(Code, &str)] = &[
    (Code::NOT_LEADER, MSG_NOT_LEADER),
    (Code::MALFORMED_REQUEST, MSG_MALFORMED),
    (Code::INCOMPATIBLE_VERSION, MSG_VERSION),
    (Code::UNSUBSCRIBED, MSG_UNSUBSCRIBED),
    (Code::NOT_AUTHENTICATED, MSG_AUTH),
    (Code::UNSUPPORTED_MEDIA_TYPE, MSG_MEDIA_TYPE),
    (Code::NOT_FOUND, MSG_NOT_FOUND),
    (Code::MESOS_UNAVAILABLE, MSG_UNAVAILABLE),
    (Code::RATE_LIMIT_EXCEEDED, MSG_RATE_LIMIT),
];

impl From<u16> for Code {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl From<Code> for u16 {
    fn from(value: Code) -> Self {
        value.0
    }
}

#[cfg(feature = "http")]
impl From<http::StatusCode> for Code {
    fn from(value: http::StatusCode) -> Self {
        Self(value.as_u16())
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_error_threshold() {
        for status in [100, 101, 200, 201, 204, 299] {
            assert!(!Code(status).is_error(), "{status} should not be an error");
        }
        for status in [300, 307, 400, 404, 499, 500, 503, 599] {
            assert!(Code(status).is_error(), "{status} should be an error");
        }
    }

    #[test]
    fn test_error_none_below_300() {
        assert!(Code(200).error("").is_none());
        assert!(Code(204).error("ignored details").is_none());
        assert!(Code(299).error("x").is_none());
    }

    #[test]
    fn test_error_canned_message() {
        let err = Code::MESOS_UNAVAILABLE.error("").unwrap();
        assert_eq!(err.to_string(), "mesos server unavailable");
        assert_eq!(err.code(), Code::MESOS_UNAVAILABLE);
    }

    #[test]
    fn test_error_appends_details() {
        let err = Code::MESOS_UNAVAILABLE.error("overloaded").unwrap();
        assert_eq!(err.to_string(), "mesos server unavailable: overloaded");
    }

    #[test]
    fn test_error_unrecognized_code() {
        let err = Code(499).error("").unwrap();
        assert_eq!(err.to_string(), "");

        let err = Code(499).error("x").unwrap();
        assert_eq!(err.to_string(), ": x");
    }

    #[test]
    fn test_error_table_messages() {
        let expected = [
            (307, "call sent to a non-leading master"),
            (401, "call not authenticated"),
            (403, "no subscription established"),
            (409, "incompatible API version"),
            (400, "malformed request"),
            (406, "unsupported media type"),
            (429, "rate limited"),
            (503, "mesos server unavailable"),
            (404, "mesos http endpoint not found"),
        ];
        assert_eq!(ERROR_TABLE.len(), expected.len());
        for (status, msg) in expected {
            assert_eq!(Code(status).message(), Some(msg));
            assert_eq!(Code(status).error("").unwrap().to_string(), msg);
        }
        assert!(Code(500).message().is_none());
    }

    #[test]
    fn test_matches_without_error() {
        assert!(Code(200).matches::<ApiError>(None));
        assert!(Code(100).matches::<ApiError>(None));
        assert!(!Code::NOT_FOUND.matches::<ApiError>(None));
    }

    #[test]
    fn test_matches_api_error() {
        let err = Code::RATE_LIMIT_EXCEEDED.error("slow down").unwrap();
        assert!(Code::RATE_LIMIT_EXCEEDED.matches(Some(&err)));
        assert!(!Code::MESOS_UNAVAILABLE.matches(Some(&err)));
        assert!(!Code(200).matches(Some(&err)));
    }

    #[derive(Debug, Deserialize)]
    struct Wrapper {
        codes: Vec<Code>,
    }

    #[test]
    fn test_serde_integers() {
        let parsed: Wrapper = toml::from_str("codes = [403, 410]").unwrap();
        assert_eq!(parsed.codes, vec![Code::UNSUBSCRIBED, Code(410)]);
    }

    #[test]
    fn test_serde_numeric_strings() {
        let parsed: Wrapper = toml::from_str(r#"codes = ["410", " 403 ", 599]"#).unwrap();
        assert_eq!(parsed.codes, vec![Code(410), Code::UNSUBSCRIBED, Code(599)]);
    }

    #[test]
    fn test_serde_rejects_non_numeric_strings() {
        assert!(toml::from_str::<Wrapper>(r#"codes = ["gone"]"#).is_err());
        assert!(toml::from_str::<Wrapper>(r#"codes = ["70000"]"#).is_err());
    }

    #[cfg(feature = "http")]
    #[test]
    fn test_from_http_status() {
        assert_eq!(Code::from(http::StatusCode::TEMPORARY_REDIRECT), Code::NOT_LEADER);
        assert_eq!(Code::from(http::StatusCode::OK), Code(200));
    }
}
