//! Maps verified token claims to stored user profiles.

use std::sync::Arc;

use crate::TRACING_TARGET_IDENTITY;
use crate::claims::TokenClaims;
use crate::error::{Error, Result};
use crate::store::ProfileStore;
use crate::types::Profile;

/// Resolves a verified token's subject to a profile.
///
/// Performs no caching on purpose: profile data must reflect the latest
/// state, so an admin-flag change takes effect on the caller's next request.
#[derive(Clone)]
pub struct IdentityResolver {
    profiles: Arc<dyn ProfileStore>,
}

impl IdentityResolver {
    /// Creates a resolver over the given profile store.
    pub fn new(profiles: Arc<dyn ProfileStore>) -> Self {
        Self { profiles }
    }

    /// Looks up the profile for the claims' subject.
    ///
    /// # Errors
    ///
    /// * [`ErrorKind::MissingSubject`] when the subject claim is empty.
    /// * [`ErrorKind::ProfileNotFound`] when no profile exists.
    /// * [`ErrorKind::StoreFailure`] for any underlying storage fault.
    ///
    /// [`ErrorKind::MissingSubject`]: crate::ErrorKind::MissingSubject
    /// [`ErrorKind::ProfileNotFound`]: crate::ErrorKind::ProfileNotFound
    /// [`ErrorKind::StoreFailure`]: crate::ErrorKind::StoreFailure
    pub async fn resolve(&self, claims: &TokenClaims) -> Result<Profile> {
        if claims.subject.is_empty() {
            tracing::warn!(
                target: TRACING_TARGET_IDENTITY,
                "token carries no subject claim"
            );
            return Err(Error::missing_subject().with_message("token is missing a user identifier"));
        }

        let profile = self
            .profiles
            .find_profile(&claims.subject)
            .await
            .map_err(|store_error| {
                tracing::error!(
                    target: TRACING_TARGET_IDENTITY,
                    error = %store_error,
                    subject = %claims.subject,
                    "profile store fault during identity resolution"
                );
                Error::store_failure()
                    .with_message("failed to load caller profile")
                    .with_source(store_error)
            })?
            .ok_or_else(|| {
                tracing::warn!(
                    target: TRACING_TARGET_IDENTITY,
                    subject = %claims.subject,
                    "no profile found for token subject"
                );
                Error::profile_not_found()
            })?;

        tracing::debug!(
            target: TRACING_TARGET_IDENTITY,
            subject = %profile.id,
            is_platform_admin = profile.is_platform_admin,
            "identity resolved"
        );

        Ok(profile)
    }
}

impl std::fmt::Debug for IdentityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityResolver").finish_non_exhaustive()
    }
}
