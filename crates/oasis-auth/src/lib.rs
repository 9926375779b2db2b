#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// Tracing target constants for consistent logging.

/// Tracing target for token verification operations.
pub const TRACING_TARGET_VERIFIER: &str = "oasis_auth::verifier";

/// Tracing target for key-set cache and fetch operations.
pub const TRACING_TARGET_KEYSET: &str = "oasis_auth::keyset";

/// Tracing target for identity resolution operations.
pub const TRACING_TARGET_IDENTITY: &str = "oasis_auth::identity";

/// Tracing target for authorization policy decisions.
pub const TRACING_TARGET_POLICY: &str = "oasis_auth::policy";

mod claims;
mod config;
mod error;
mod identity;
mod policy;
mod service;

pub mod keyset;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod prelude;
pub mod store;
pub mod types;
pub mod verifier;

pub use crate::claims::TokenClaims;
pub use crate::config::{AuthConfig, VerificationMode};
pub use crate::error::{BoxedError, Error, ErrorKind, Result};
pub use crate::identity::IdentityResolver;
pub use crate::policy::PolicyEngine;
pub use crate::service::AuthService;
