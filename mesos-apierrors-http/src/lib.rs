#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! HTTP transport adapters for Mesos API error classification.
//!
//! Hands `reqwest` responses to the [`mesos_apierrors`] classifier, either
//! directly or as a `reqwest-middleware` layer.
//!
//! # Modules
//!
//! - [`client`] — Classification of `reqwest` responses (feature: `client`)
//! - [`error`] — Transport error type wrapping [`ApiError`](mesos_apierrors::ApiError) (feature: `client`)
//! - [`middleware`] — `reqwest-middleware` layer (feature: `middleware`)
//!
//! # Feature Flags
//!
//! - `client` - reqwest response classification
//! - `middleware` - [`middleware::ApiErrorMiddleware`] for `reqwest-middleware` clients
//! - `telemetry` - Enables tracing instrumentation for debugging and monitoring

#[cfg(feature = "client")]
pub mod client;
#[cfg(feature = "client")]
pub mod error;
#[cfg(feature = "middleware")]
pub mod middleware;

#[cfg(feature = "client")]
pub use client::{error_for_status, from_response, send};
#[cfg(feature = "client")]
pub use error::ClientError;
