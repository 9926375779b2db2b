//! Read-only traits over the external profile and membership stores.
//!
//! Storage is an external collaborator: implementations live in the service
//! that embeds this core (a database layer, a remote directory, or the mocks
//! in [`crate::mock`]). Both traits are object-safe so they can be injected
//! as `Arc<dyn ...>` handles.

use async_trait::async_trait;

use crate::error::BoxedError;
use crate::types::{Membership, Profile};

/// Point reads over the profile store.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetches the profile with the given id.
    ///
    /// Returns `Ok(None)` when no profile exists. Implementations must not
    /// cache results; admin-flag changes take effect on the next request.
    ///
    /// # Errors
    ///
    /// Returns the underlying storage fault, surfaced upstream as a
    /// 500-class outcome.
    async fn find_profile(&self, user_id: &str) -> Result<Option<Profile>, BoxedError>;
}

/// Point reads over the membership store.
#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// Fetches the membership for the given (user, organization) pair.
    ///
    /// When duplicate rows exist, the first is authoritative and must be the
    /// one returned; the rest are not considered.
    ///
    /// # Errors
    ///
    /// Returns the underlying storage fault, surfaced upstream as a
    /// 500-class outcome.
    async fn find_membership(
        &self,
        user_id: &str,
        organization_id: &str,
    ) -> Result<Option<Membership>, BoxedError>;
}
