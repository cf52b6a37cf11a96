#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Error classification for the Mesos HTTP v1 API.
//!
//! Mesos reports failed calls through HTTP status codes. This crate turns a
//! response status, plus the start of the response body, into an
//! [`ApiError`] and answers the questions a client's retry loop asks about
//! it: is the condition temporary, and has the event subscription been lost?
//!
//! # Overview
//!
//! ```rust
//! use mesos_apierrors::{Code, RawResponse, from_response};
//!
//! let res = RawResponse::new(Code::UNSUBSCRIBED).with_body(&b"framework removed"[..]);
//! let err = from_response(Some(res)).unwrap();
//!
//! assert_eq!(err.to_string(), "no subscription established: framework removed");
//! assert!(err.subscription_loss());
//! assert!(!err.temporary());
//! assert!(Code::UNSUBSCRIBED.matches(Some(&err)));
//! ```
//!
//! # Modules
//!
//! - [`code`] - Status codes, canned messages, and error construction
//! - [`error`] - The [`ApiError`] type and its classification predicates
//! - [`response`] - Classification of transport responses
//! - [`subscription`] - Process-wide registry of subscription loss codes
//! - [`config`] - TOML/environment configuration for the classifier
//!
//! # Feature Flags
//!
//! - `http` - Implements [`ApiResponse`] for [`http::Response`]
//! - `telemetry` - Enables tracing instrumentation for debugging and monitoring

pub mod code;
pub mod config;
pub mod error;
pub mod response;
pub mod subscription;

pub use code::{Code, ERROR_TABLE, MAX_SIZE_DETAILS};
pub use error::{ApiError, AsApiError, ErrorKind};
pub use response::{ApiResponse, RawResponse, from_response};
pub use subscription::{
    add_subscription_loss_code, is_subscription_loss_code, remove_subscription_loss_code,
    subscription_loss_codes,
};
