//! Authenticated session extractor.
//!
//! [`AuthSession`] performs the full authentication pipeline during
//! extraction: bearer token verification, profile resolution, and capture of
//! the organization scope. Authorization stays a separate, explicit step in
//! the handler, through the methods here or the [`authorize!`] macro.
//!
//! # Usage
//!
//! ```rust,ignore
//! use oasis_axum::{AuthSession, Result, authorize};
//! use oasis_auth::types::OrgRole;
//!
//! async fn list_members(session: AuthSession) -> Result<String> {
//!     let context = authorize!(roles: session, OrgRole::Owner, OrgRole::Admin);
//!     Ok(format!("authorized as {}", context.effective_role))
//! }
//! ```
//!
//! [`authorize!`]: crate::authorize

use axum::extract::{FromRef, FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;
use derive_more::Deref;
use oasis_auth::AuthService;
use oasis_auth::types::{AuthContext, OrgRole, Profile};

use super::{BearerToken, OrgContext};
use crate::error::{Error, Result};
use crate::{TRACING_TARGET_AUTHENTICATION, TRACING_TARGET_AUTHORIZATION};

/// Verified caller identity plus the request's organization scope.
///
/// Extraction succeeds only for a cryptographically valid token whose
/// subject resolves to a stored profile. The verified session is cached in
/// request extensions, so later extractions in the same request are free.
///
/// Dereferences to the resolved [`Profile`].
#[derive(Clone, Deref)]
pub struct AuthSession {
    #[deref]
    profile: Profile,
    organization: Option<String>,
    service: AuthService,
}

impl AuthSession {
    /// Returns the resolved caller profile.
    #[inline]
    #[must_use]
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Returns the organization scope from the request, if any.
    #[inline]
    #[must_use]
    pub fn organization(&self) -> Option<&str> {
        self.organization.as_deref()
    }

    /// Requires the caller to be a platform administrator.
    ///
    /// # Errors
    ///
    /// Returns a 403 response for everyone else.
    pub fn require_platform_admin(&self) -> Result<AuthContext> {
        let context = self
            .service
            .require_platform_admin(&self.profile)
            .map_err(|error| self.deny(error))?;
        Ok(context)
    }

    /// Authorizes the caller against an allow-list of organization roles,
    /// scoped by the request's organization header.
    ///
    /// # Errors
    ///
    /// Returns 400 when a non-admin request carries no organization header,
    /// 403 for membership and role denials, and 500 for store faults.
    pub async fn authorize_roles(&self, allowed: &[OrgRole]) -> Result<AuthContext> {
        let context = self
            .service
            .authorize_roles(&self.profile, self.organization(), allowed)
            .await
            .map_err(|error| self.deny(error))?;
        Ok(context)
    }

    /// Authorizes any active member of the request's organization.
    ///
    /// # Errors
    ///
    /// Same as [`AuthSession::authorize_roles`], minus the role check.
    pub async fn authorize_member(&self) -> Result<AuthContext> {
        let context = self
            .service
            .authorize_member(&self.profile, self.organization())
            .await
            .map_err(|error| self.deny(error))?;
        Ok(context)
    }

    /// Authorizes against an organization named by the request path,
    /// ignoring the organization header.
    ///
    /// # Errors
    ///
    /// Same as [`AuthSession::authorize_roles`].
    pub async fn authorize_org(
        &self,
        organization_id: &str,
        allowed: &[OrgRole],
    ) -> Result<AuthContext> {
        let context = self
            .service
            .authorize_org(&self.profile, organization_id, allowed)
            .await
            .map_err(|error| self.deny(error))?;
        Ok(context)
    }

    fn deny(&self, error: oasis_auth::Error) -> Error<'static> {
        tracing::warn!(
            target: TRACING_TARGET_AUTHORIZATION,
            subject = %self.profile.id,
            organization = ?self.organization,
            error = %error,
            "request authorization denied"
        );
        Error::from(error)
    }
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("profile", &self.profile.id)
            .field("organization", &self.organization)
            .finish_non_exhaustive()
    }
}

impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
    AuthService: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Cached by an earlier extraction in the same request.
        if let Some(session) = parts.extensions.get::<Self>() {
            return Ok(session.clone());
        }

        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;
        let OrgContext(organization) = OrgContext::from_request_parts(parts, state).await?;

        let service = AuthService::from_ref(state);
        let profile = service.authenticate(&token).await.map_err(|error| {
            tracing::warn!(
                target: TRACING_TARGET_AUTHENTICATION,
                error = %error,
                "request authentication failed"
            );
            Error::from(error)
        })?;

        tracing::debug!(
            target: TRACING_TARGET_AUTHENTICATION,
            subject = %profile.id,
            organization = ?organization,
            "request authenticated"
        );

        let session = Self {
            profile,
            organization,
            service,
        };

        parts.extensions.insert(session.clone());
        Ok(session)
    }
}

impl<S> OptionalFromRequestParts<S> for AuthSession
where
    S: Send + Sync,
    AuthService: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        match <Self as FromRequestParts<S>>::from_request_parts(parts, state).await {
            Ok(session) => Ok(Some(session)),
            Err(_) => Ok(None),
        }
    }
}

/// Performs an authorization check inside a handler, returning the granted
/// [`AuthContext`] or propagating the denial with `?`.
///
/// ```rust,ignore
/// let context = authorize!(admin: session);
/// let context = authorize!(member: session);
/// let context = authorize!(roles: session, OrgRole::Owner, OrgRole::Admin);
/// let context = authorize!(org: session, &org_id, OrgRole::Owner);
/// ```
#[macro_export]
macro_rules! authorize {
    // Platform administration
    (admin: $session:expr $(,)?) => {
        $session.require_platform_admin()?
    };

    // Any active member of the scoped organization
    (member: $session:expr $(,)?) => {
        $session.authorize_member().await?
    };

    // Allow-listed roles within the scoped organization
    (roles: $session:expr, $($role:expr),+ $(,)?) => {
        $session.authorize_roles(&[$($role),+]).await?
    };

    // Allow-listed roles within a path-named organization
    (org: $session:expr, $organization_id:expr, $($role:expr),+ $(,)?) => {
        $session.authorize_org($organization_id, &[$($role),+]).await?
    };
}
