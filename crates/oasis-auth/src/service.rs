//! The assembled authentication and authorization facade.

use std::sync::Arc;

use crate::claims::TokenClaims;
use crate::config::AuthConfig;
use crate::error::Result;
use crate::identity::IdentityResolver;
use crate::policy::PolicyEngine;
use crate::store::{MembershipStore, ProfileStore};
use crate::types::{AuthContext, OrgRole, Profile};
use crate::verifier::TokenVerifier;

/// Shared handle over the verifier, resolver, and policy engine.
///
/// Cheap to clone; all clones share the same verifier state, including the
/// key-set cache in asymmetric mode.
#[derive(Clone)]
pub struct AuthService {
    inner: Arc<AuthServiceInner>,
}

struct AuthServiceInner {
    verifier: TokenVerifier,
    identity: IdentityResolver,
    policy: PolicyEngine,
}

impl AuthService {
    /// Assembles the service from a verifier and the two stores.
    pub fn new(
        verifier: TokenVerifier,
        profiles: Arc<dyn ProfileStore>,
        memberships: Arc<dyn MembershipStore>,
    ) -> Self {
        Self {
            inner: Arc::new(AuthServiceInner {
                verifier,
                identity: IdentityResolver::new(profiles),
                policy: PolicyEngine::new(memberships),
            }),
        }
    }

    /// Assembles the service with the verifier built from configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when [`AuthConfig::validate`] rejects
    /// the configuration.
    pub fn from_config(
        config: &AuthConfig,
        profiles: Arc<dyn ProfileStore>,
        memberships: Arc<dyn MembershipStore>,
    ) -> Result<Self> {
        let verifier = TokenVerifier::from_config(config)?;
        Ok(Self::new(verifier, profiles, memberships))
    }

    /// Verifies a raw bearer token and resolves the caller's profile.
    ///
    /// # Errors
    ///
    /// Propagates verification failures ([`ErrorKind::InvalidToken`],
    /// [`ErrorKind::IdentityUnavailable`]) and resolution failures
    /// ([`ErrorKind::MissingSubject`], [`ErrorKind::ProfileNotFound`],
    /// [`ErrorKind::StoreFailure`]).
    ///
    /// [`ErrorKind::InvalidToken`]: crate::ErrorKind::InvalidToken
    /// [`ErrorKind::IdentityUnavailable`]: crate::ErrorKind::IdentityUnavailable
    /// [`ErrorKind::MissingSubject`]: crate::ErrorKind::MissingSubject
    /// [`ErrorKind::ProfileNotFound`]: crate::ErrorKind::ProfileNotFound
    /// [`ErrorKind::StoreFailure`]: crate::ErrorKind::StoreFailure
    pub async fn authenticate(&self, token: &str) -> Result<Profile> {
        let claims = self.verify_token(token).await?;
        self.inner.identity.resolve(&claims).await
    }

    /// Verifies a raw bearer token without resolving the profile.
    pub async fn verify_token(&self, token: &str) -> Result<TokenClaims> {
        self.inner.verifier.verify(token).await
    }

    /// See [`PolicyEngine::require_platform_admin`].
    pub fn require_platform_admin(&self, profile: &Profile) -> Result<AuthContext> {
        self.inner.policy.require_platform_admin(profile)
    }

    /// See [`PolicyEngine::authorize_roles`].
    pub async fn authorize_roles(
        &self,
        profile: &Profile,
        organization_id: Option<&str>,
        allowed: &[OrgRole],
    ) -> Result<AuthContext> {
        self.inner
            .policy
            .authorize_roles(profile, organization_id, allowed)
            .await
    }

    /// See [`PolicyEngine::authorize_member`].
    pub async fn authorize_member(
        &self,
        profile: &Profile,
        organization_id: Option<&str>,
    ) -> Result<AuthContext> {
        self.inner
            .policy
            .authorize_member(profile, organization_id)
            .await
    }

    /// See [`PolicyEngine::authorize_org`].
    pub async fn authorize_org(
        &self,
        profile: &Profile,
        organization_id: &str,
        allowed: &[OrgRole],
    ) -> Result<AuthContext> {
        self.inner
            .policy
            .authorize_org(profile, organization_id, allowed)
            .await
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService").finish_non_exhaustive()
    }
}
