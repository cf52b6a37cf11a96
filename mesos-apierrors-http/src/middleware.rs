//! `reqwest-middleware` integration.
//!
//! [`ApiErrorMiddleware`] classifies every response flowing through a
//! [`reqwest_middleware::ClientWithMiddleware`]. Error statuses surface as
//! [`reqwest_middleware::Error::Middleware`] wrapping a [`ClientError::Api`];
//! use [`api_error`] to get the [`ApiError`] back out.

use mesos_apierrors::ApiError;
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next};

use crate::client::error_for_status;
use crate::error::ClientError;

/// reqwest-middleware that turns Mesos error statuses into errors.
///
/// # Example
///
/// ```no_run
/// use mesos_apierrors_http::middleware::ApiErrorMiddleware;
/// use reqwest_middleware::ClientBuilder;
///
/// let client = ClientBuilder::new(reqwest::Client::new())
///     .with(ApiErrorMiddleware)
///     .build();
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiErrorMiddleware;

#[async_trait::async_trait]
impl Middleware for ApiErrorMiddleware {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut http::Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        let res = next.run(req, extensions).await?;
        error_for_status(res)
            .await
            .map_err(|err| reqwest_middleware::Error::middleware(ClientError::Api(err)))
    }
}

/// Returns the [`ApiError`] carried by a middleware error, if any.
#[must_use]
pub fn api_error(err: &reqwest_middleware::Error) -> Option<&ApiError> {
    if let reqwest_middleware::Error::Middleware(inner) = err {
        if let Some(ClientError::Api(api)) = inner.downcast_ref::<ClientError>() {
            return Some(api);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesos_apierrors::Code;
    use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> ClientWithMiddleware {
        ClientBuilder::new(reqwest::Client::new())
            .with(ApiErrorMiddleware)
            .build()
    }

    #[tokio::test]
    async fn test_success_passes_through() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/state"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .mount(&mock_server)
            .await;

        let res = client()
            .get(format!("{}/state", mock_server.uri()))
            .send()
            .await
            .unwrap();
        assert_eq!(res.text().await.unwrap(), "{}");
    }

    #[tokio::test]
    async fn test_error_status_becomes_api_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/scheduler"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&mock_server)
            .await;

        let err = client()
            .post(format!("{}/api/v1/scheduler", mock_server.uri()))
            .send()
            .await
            .unwrap_err();
        let api = api_error(&err).unwrap();
        assert!(Code::RATE_LIMIT_EXCEEDED.matches(Some(api)));
        assert!(api.temporary());
        assert_eq!(api.to_string(), "rate limited: slow down");
    }

    #[tokio::test]
    async fn test_transport_error_is_not_api_error() {
        // nothing listens on port 1
        let err = client()
            .get("http://127.0.0.1:1/state")
            .send()
            .await
            .unwrap_err();
        assert!(api_error(&err).is_none());
    }
}
