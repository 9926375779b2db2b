#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// Tracing target constants for consistent logging.

/// Tracing target for request authentication.
pub const TRACING_TARGET_AUTHENTICATION: &str = "oasis_axum::authentication";

/// Tracing target for request authorization.
pub const TRACING_TARGET_AUTHORIZATION: &str = "oasis_axum::authorization";

pub mod error;
pub mod extract;

pub use crate::error::{Error, ErrorKind, ErrorResponse, Result};
pub use crate::extract::{AuthSession, BearerToken, OrgContext};
