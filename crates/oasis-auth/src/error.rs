//! Common error type definitions for authentication and authorization.

use strum::{AsRefStr, IntoStaticStr};
use thiserror::Error as ThisError;

/// Type alias for boxed dynamic errors that can be sent across threads.
///
/// Used as the fault type of the [`store`] traits and as the source slot of
/// [`Error`], so any collaborator error can be attached without coupling this
/// crate to a specific storage or HTTP stack.
///
/// [`store`]: crate::store
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with our custom Error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Categories of authentication and authorization failures.
///
/// The first group is caller-fault (the caller can self-correct), the second
/// is dependency-fault (surfaced as 5xx upstream), and [`Configuration`]
/// only occurs while constructing components at startup.
///
/// [`Configuration`]: ErrorKind::Configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Bearer token is malformed, tampered, expired, or has a wrong audience.
    InvalidToken,
    /// Verified token carries no subject claim.
    MissingSubject,
    /// No profile exists for the token subject.
    ProfileNotFound,
    /// Organization context is required but was not supplied.
    MissingOrgContext,
    /// Caller has no membership in the requested organization.
    NotAMember,
    /// Caller's membership exists but is not active.
    InactiveMembership,
    /// Caller's role is not in the allowed set.
    InsufficientRole,

    /// Profile or membership storage fault.
    StoreFailure,
    /// Identity provider key material could not be obtained.
    IdentityUnavailable,
    /// Invalid component configuration (startup-time only).
    Configuration,
}

impl ErrorKind {
    /// Returns `true` for faults of an external dependency rather than the caller.
    #[must_use]
    pub const fn is_dependency_fault(self) -> bool {
        matches!(
            self,
            Self::StoreFailure | Self::IdentityUnavailable | Self::Configuration
        )
    }
}

/// A structured error type for authentication and authorization operations.
#[derive(Debug, ThisError)]
#[error("{}{}", kind.as_ref(), message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
pub struct Error {
    /// The kind of failure that occurred.
    pub kind: ErrorKind,
    /// Optional human-readable detail.
    pub message: Option<String>,
    /// Optional source error.
    #[source]
    pub source: Option<BoxedError>,
}

impl Error {
    /// Creates a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            source: None,
        }
    }

    /// Adds a message to this error.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Adds a source error to this error.
    pub fn with_source(mut self, source: impl Into<BoxedError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Creates a new invalid token error.
    pub fn invalid_token() -> Self {
        Self::new(ErrorKind::InvalidToken)
    }

    /// Creates a new missing subject error.
    pub fn missing_subject() -> Self {
        Self::new(ErrorKind::MissingSubject)
    }

    /// Creates a new profile not found error.
    pub fn profile_not_found() -> Self {
        Self::new(ErrorKind::ProfileNotFound)
    }

    /// Creates a new missing organization context error.
    pub fn missing_org_context() -> Self {
        Self::new(ErrorKind::MissingOrgContext)
    }

    /// Creates a new not-a-member error.
    pub fn not_a_member() -> Self {
        Self::new(ErrorKind::NotAMember)
    }

    /// Creates a new inactive membership error.
    pub fn inactive_membership() -> Self {
        Self::new(ErrorKind::InactiveMembership)
    }

    /// Creates a new insufficient role error.
    pub fn insufficient_role() -> Self {
        Self::new(ErrorKind::InsufficientRole)
    }

    /// Creates a new storage fault error.
    pub fn store_failure() -> Self {
        Self::new(ErrorKind::StoreFailure)
    }

    /// Creates a new identity provider unavailable error.
    pub fn identity_unavailable() -> Self {
        Self::new(ErrorKind::IdentityUnavailable)
    }

    /// Creates a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration).with_message(message)
    }
}
