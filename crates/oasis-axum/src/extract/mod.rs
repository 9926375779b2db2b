//! Request extractors for the authentication boundary.
//!
//! [`AuthSession`] is the primary extractor: it verifies the bearer token,
//! resolves the caller's profile, and captures the organization scope in one
//! step, caching the result in request extensions. [`BearerToken`] and
//! [`OrgContext`] are its building blocks and can be used on their own.

mod auth_session;
mod bearer_token;
mod org_context;

pub use self::auth_session::AuthSession;
pub use self::bearer_token::BearerToken;
pub use self::org_context::OrgContext;
