//! Convenient re-exports for common use.

pub use crate::claims::TokenClaims;
pub use crate::config::{AuthConfig, VerificationMode};
pub use crate::error::{BoxedError, Error, ErrorKind, Result};
pub use crate::identity::IdentityResolver;
pub use crate::keyset::KeysetCache;
pub use crate::policy::PolicyEngine;
pub use crate::service::AuthService;
pub use crate::store::{MembershipStore, ProfileStore};
pub use crate::types::{AuthContext, Membership, MembershipStatus, OrgRole, Profile};
pub use crate::verifier::TokenVerifier;
