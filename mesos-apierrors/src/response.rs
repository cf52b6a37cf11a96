//! Classification of HTTP responses handed over by a transport.
//!
//! The transport owns connections and request construction. It passes a
//! finished response to [`from_response`], which inspects the status code and,
//! for error statuses, captures up to [`MAX_SIZE_DETAILS`] bytes of the body
//! as error details.
//!
//! Responses are taken by value: the body is dropped, and so released,
//! exactly once on every return path.

use std::fmt;
use std::io::{self, Read};

#[cfg(feature = "telemetry")]
use tracing::debug;

use crate::code::{Code, MAX_SIZE_DETAILS};
use crate::error::ApiError;

/// A response whose status and body can be classified.
pub trait ApiResponse {
    /// Readable response body.
    type Body: Read;

    /// Returns the response status code.
    fn status(&self) -> Code;

    /// Consumes the response, returning its body if it has one.
    fn into_body(self) -> Option<Self::Body>;
}

/// A transport-agnostic response: a status code and an optional body.
pub struct RawResponse<B = Box<dyn Read + Send>> {
    status: Code,
    body: Option<B>,
}

impl<B> RawResponse<B> {
    /// Creates a response without a body.
    #[must_use]
    pub const fn new(status: Code) -> Self {
        Self { status, body: None }
    }

    /// Attaches a body to the response.
    #[must_use]
    pub fn with_body(mut self, body: B) -> Self {
        self.body = Some(body);
        self
    }
}

impl<B> fmt::Debug for RawResponse<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawResponse")
            .field("status", &self.status)
            .field("has_body", &self.body.is_some())
            .finish()
    }
}

impl<B: Read> ApiResponse for RawResponse<B> {
    type Body = B;

    fn status(&self) -> Code {
        self.status
    }

    fn into_body(self) -> Option<B> {
        self.body
    }
}

#[cfg(feature = "http")]
impl<B: Read> ApiResponse for http::Response<B> {
    type Body = B;

    fn status(&self) -> Code {
        http::Response::status(self).into()
    }

    fn into_body(self) -> Option<B> {
        Some(http::Response::into_body(self))
    }
}

/// Returns an [`ApiError`] for a response whose status code indicates an
/// error condition, with the start of the body as details.
///
/// Returns `None` for a missing response and for non-error status codes. The
/// response is consumed either way.
pub fn from_response<R>(res: Option<R>) -> Option<ApiError>
where
    R: ApiResponse,
{
    let res = res?;
    let code = res.status();
    if !code.is_error() {
        return None;
    }

    let details = res.into_body().map(read_details).unwrap_or_default();

    #[cfg(feature = "telemetry")]
    debug!(
        code = code.as_u16(),
        details_len = details.len(),
        "Classified API error response"
    );

    code.error(&details)
}

/// Reads at most [`MAX_SIZE_DETAILS`] bytes from `body` as error details.
///
/// Read errors end the capture early; whatever was read before the failure
/// is kept. The body is dropped before returning. See
/// [`details_from_bytes`] for decoding.
pub fn read_details<B: Read>(body: B) -> String {
    let mut buf = Vec::new();
    if let Err(err) = body.take(MAX_SIZE_DETAILS as u64).read_to_end(&mut buf) {
        record_read_failure(&err, buf.len());
    }
    details_from_bytes(&buf)
}

#[cfg(feature = "telemetry")]
fn record_read_failure(err: &io::Error, captured: usize) {
    debug!(error = %err, captured, "Failed to read response body details");
}

/// Noop if telemetry feature is off.
#[cfg(not(feature = "telemetry"))]
const fn record_read_failure(_err: &io::Error, _captured: usize) {}

/// Decodes captured body bytes as UTF-8 text of at most
/// [`MAX_SIZE_DETAILS`] bytes.
///
/// A multi-byte sequence cut off at the end of the buffer is dropped. Other
/// invalid sequences are replaced with `U+FFFD`. Decoding stops at the cap
/// without splitting a character.
#[must_use]
pub fn details_from_bytes(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len().min(MAX_SIZE_DETAILS));
    let mut chunks = bytes.utf8_chunks().peekable();
    while let Some(chunk) = chunks.next() {
        if !push_capped(&mut text, chunk.valid()) {
            break;
        }
        let invalid = chunk.invalid();
        if invalid.is_empty() || (chunks.peek().is_none() && is_cut_sequence(invalid)) {
            continue;
        }
        if !push_capped(&mut text, REPLACEMENT) {
            break;
        }
    }
    text
}

const REPLACEMENT: &str = "\u{fffd}";

/// Appends as much of `part` as fits under the cap. Returns `false` once
/// something had to be left out.
fn push_capped(text: &mut String, part: &str) -> bool {
    let room = MAX_SIZE_DETAILS - text.len();
    if part.len() <= room {
        text.push_str(part);
        return true;
    }
    let mut end = room;
    while !part.is_char_boundary(end) {
        end -= 1;
    }
    text.push_str(&part[..end]);
    false
}

/// A prefix of a valid multi-byte sequence, as opposed to bytes that can
/// never start one.
fn is_cut_sequence(invalid: &[u8]) -> bool {
    std::str::from_utf8(invalid).is_err_and(|err| err.error_len().is_none())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Body that counts drops and can fail after a number of bytes.
    struct TrackedBody {
        inner: Cursor<Vec<u8>>,
        fail_after: Option<usize>,
        released: Arc<AtomicUsize>,
    }

    impl TrackedBody {
        fn new(data: &[u8], released: &Arc<AtomicUsize>) -> Self {
            Self {
                inner: Cursor::new(data.to_vec()),
                fail_after: None,
                released: Arc::clone(released),
            }
        }

        fn failing_after(mut self, n: usize) -> Self {
            self.fail_after = Some(n);
            self
        }
    }

    impl Read for TrackedBody {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let pos = usize::try_from(self.inner.position()).unwrap();
            match self.fail_after {
                Some(limit) if pos >= limit => Err(io::Error::other("connection reset")),
                Some(limit) => {
                    let len = buf.len().min(limit - pos);
                    self.inner.read(&mut buf[..len])
                }
                None => self.inner.read(buf),
            }
        }
    }

    impl Drop for TrackedBody {
        fn drop(&mut self) {
            self.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_missing_response() {
        assert!(from_response(None::<RawResponse>).is_none());
    }

    #[test]
    fn test_success_releases_body() {
        let released = Arc::new(AtomicUsize::new(0));
        let res = RawResponse::new(Code(200)).with_body(TrackedBody::new(b"ok", &released));
        assert!(from_response(Some(res)).is_none());
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_error_without_body() {
        let err = from_response(Some(RawResponse::<&[u8]>::new(Code::NOT_LEADER))).unwrap();
        assert_eq!(err.to_string(), "call sent to a non-leading master");
        assert_eq!(err.code(), Code::NOT_LEADER);
    }

    #[test]
    fn test_unsubscribed_with_details() {
        let released = Arc::new(AtomicUsize::new(0));
        let res = RawResponse::new(Code::UNSUBSCRIBED)
            .with_body(TrackedBody::new(b"extra info", &released));
        let err = from_response(Some(res)).unwrap();
        assert_eq!(err.to_string(), "no subscription established: extra info");
        assert!(err.subscription_loss());
        assert!(!err.temporary());
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_details_truncated() {
        let body = vec![b'a'; 10_000];
        let res = RawResponse::new(Code(500)).with_body(Cursor::new(body));
        let err = from_response(Some(res)).unwrap();
        // unrecognized code: empty base message followed by ": "
        assert_eq!(err.to_string().len(), 2 + MAX_SIZE_DETAILS);
        assert_eq!(read_details(&[b'b'; 10_000][..]).len(), MAX_SIZE_DETAILS);
    }

    #[test]
    fn test_read_error_keeps_partial_details() {
        let released = Arc::new(AtomicUsize::new(0));
        let body = TrackedBody::new(b"overloaded, try later", &released).failing_after(10);
        let res = RawResponse::new(Code::MESOS_UNAVAILABLE).with_body(body);
        let err = from_response(Some(res)).unwrap();
        assert_eq!(err.to_string(), "mesos server unavailable: overloaded");
        assert!(err.temporary());
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_read_error_before_any_bytes() {
        let released = Arc::new(AtomicUsize::new(0));
        let body = TrackedBody::new(b"ignored", &released).failing_after(0);
        let res = RawResponse::new(Code::NOT_FOUND).with_body(body);
        let err = from_response(Some(res)).unwrap();
        assert_eq!(err.to_string(), "mesos http endpoint not found");
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_boxed_body() {
        let res: RawResponse =
            RawResponse::new(Code::MALFORMED_REQUEST).with_body(Box::new(&b"bad json"[..]));
        let err = from_response(Some(res)).unwrap();
        assert_eq!(err.to_string(), "malformed request: bad json");
    }

    #[test]
    fn test_details_drop_cut_multibyte_sequence() {
        let mut bytes = "é".repeat(3).into_bytes();
        bytes.pop();
        assert_eq!(details_from_bytes(&bytes), "éé");
    }

    #[test]
    fn test_details_replace_invalid_bytes() {
        assert_eq!(details_from_bytes(&[b'a', 0xff, b'b']), "a\u{fffd}b");
        assert_eq!(details_from_bytes(&[b'a', 0xff]), "a\u{fffd}");
        assert_eq!(details_from_bytes(&[0xc3, b'a']), "\u{fffd}a");
    }

    #[test]
    fn test_details_invalid_byte_then_cut_sequence() {
        assert_eq!(details_from_bytes(&[b'a', 0xff, b'b', 0xc3]), "a\u{fffd}b");
        assert_eq!(details_from_bytes(&[0xff, 0xe2, 0x82]), "\u{fffd}");
    }

    #[test]
    fn test_details_invalid_bytes_stay_under_cap() {
        // 1365 replacement characters of 3 bytes each
        assert_eq!(details_from_bytes(&[0xff; 10_000]).len(), 4095);
        let details = read_details(&[0xff; 10_000][..]);
        assert_eq!(details.len(), 4095);
        assert!(details.chars().all(|c| c == '\u{fffd}'));

        let mut bytes = vec![b'x'; MAX_SIZE_DETAILS - 1];
        bytes.push(0xff);
        let details = details_from_bytes(&bytes);
        assert_eq!(details.len(), MAX_SIZE_DETAILS - 1);
        assert!(details.bytes().all(|b| b == b'x'));
    }

    #[cfg(feature = "http")]
    #[test]
    fn test_http_response() {
        let res = http::Response::builder()
            .status(http::StatusCode::FORBIDDEN)
            .body(&b"extra info"[..])
            .unwrap();
        let err = from_response(Some(res)).unwrap();
        assert_eq!(err.to_string(), "no subscription established: extra info");

        let ok = http::Response::builder()
            .status(http::StatusCode::ACCEPTED)
            .body(&b""[..])
            .unwrap();
        assert!(from_response(Some(ok)).is_none());
    }
}
