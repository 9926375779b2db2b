//! Organization-scoped authorization decisions.

use std::sync::Arc;

use crate::TRACING_TARGET_POLICY;
use crate::error::{Error, Result};
use crate::store::MembershipStore;
use crate::types::{AuthContext, OrgRole, Profile};

/// Decides whether a resolved profile may act within an organization.
///
/// Every entry point funnels into one decision core so the super-admin
/// bypass, membership checks, and role checks cannot drift apart. Decisions
/// are made fresh per call; membership state is never cached here.
#[derive(Clone)]
pub struct PolicyEngine {
    memberships: Arc<dyn MembershipStore>,
}

impl PolicyEngine {
    /// Creates a policy engine over the given membership store.
    pub fn new(memberships: Arc<dyn MembershipStore>) -> Self {
        Self { memberships }
    }

    /// Requires the caller to be a platform administrator.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InsufficientRole`] for everyone else.
    ///
    /// [`ErrorKind::InsufficientRole`]: crate::ErrorKind::InsufficientRole
    pub fn require_platform_admin(&self, profile: &Profile) -> Result<AuthContext> {
        if !profile.is_platform_admin {
            tracing::warn!(
                target: TRACING_TARGET_POLICY,
                subject = %profile.id,
                "platform administration denied"
            );
            return Err(Error::insufficient_role()
                .with_message("platform administrator access is required"));
        }

        Ok(Self::bypass_context(profile, None))
    }

    /// Authorizes a caller against an allow-list of organization roles.
    ///
    /// The organization scope is optional at the call site because platform
    /// admins may operate unscoped; everyone else must provide it.
    ///
    /// # Errors
    ///
    /// * [`ErrorKind::MissingOrgContext`] when a non-admin omits the scope.
    /// * [`ErrorKind::NotAMember`] when no membership exists.
    /// * [`ErrorKind::InactiveMembership`] when the membership is not active.
    /// * [`ErrorKind::InsufficientRole`] when the stored role is not allowed.
    /// * [`ErrorKind::StoreFailure`] for underlying storage faults.
    ///
    /// [`ErrorKind::MissingOrgContext`]: crate::ErrorKind::MissingOrgContext
    /// [`ErrorKind::NotAMember`]: crate::ErrorKind::NotAMember
    /// [`ErrorKind::InactiveMembership`]: crate::ErrorKind::InactiveMembership
    /// [`ErrorKind::InsufficientRole`]: crate::ErrorKind::InsufficientRole
    /// [`ErrorKind::StoreFailure`]: crate::ErrorKind::StoreFailure
    pub async fn authorize_roles(
        &self,
        profile: &Profile,
        organization_id: Option<&str>,
        allowed: &[OrgRole],
    ) -> Result<AuthContext> {
        self.resolve_context(profile, organization_id, Some(allowed))
            .await
    }

    /// Authorizes any active member of the organization, regardless of role.
    ///
    /// # Errors
    ///
    /// Same as [`PolicyEngine::authorize_roles`], minus the role check.
    pub async fn authorize_member(
        &self,
        profile: &Profile,
        organization_id: Option<&str>,
    ) -> Result<AuthContext> {
        self.resolve_context(profile, organization_id, None).await
    }

    /// Authorizes against an organization named by the request path.
    ///
    /// The scope is mandatory here by construction, so the missing-scope
    /// failure mode cannot occur.
    ///
    /// # Errors
    ///
    /// Same as [`PolicyEngine::authorize_roles`].
    pub async fn authorize_org(
        &self,
        profile: &Profile,
        organization_id: &str,
        allowed: &[OrgRole],
    ) -> Result<AuthContext> {
        self.resolve_context(profile, Some(organization_id), Some(allowed))
            .await
    }

    /// The shared decision core.
    ///
    /// Order is fixed: super-admin bypass, scope presence, membership lookup,
    /// activity check, then the role allow-list (when one is given).
    async fn resolve_context(
        &self,
        profile: &Profile,
        organization_id: Option<&str>,
        allowed: Option<&[OrgRole]>,
    ) -> Result<AuthContext> {
        if profile.is_platform_admin {
            tracing::debug!(
                target: TRACING_TARGET_POLICY,
                subject = %profile.id,
                organization = ?organization_id,
                "platform admin bypass applied"
            );
            return Ok(Self::bypass_context(profile, organization_id));
        }

        let Some(organization_id) = organization_id else {
            tracing::warn!(
                target: TRACING_TARGET_POLICY,
                subject = %profile.id,
                "request lacks an organization scope"
            );
            return Err(Error::missing_org_context()
                .with_message("an organization context is required for this operation"));
        };

        let membership = self
            .memberships
            .find_membership(&profile.id, organization_id)
            .await
            .map_err(|store_error| {
                tracing::error!(
                    target: TRACING_TARGET_POLICY,
                    error = %store_error,
                    subject = %profile.id,
                    organization = %organization_id,
                    "membership store fault during authorization"
                );
                Error::store_failure()
                    .with_message("failed to load organization membership")
                    .with_source(store_error)
            })?
            .ok_or_else(|| {
                tracing::warn!(
                    target: TRACING_TARGET_POLICY,
                    subject = %profile.id,
                    organization = %organization_id,
                    "caller is not a member of the organization"
                );
                Error::not_a_member()
            })?;

        if !membership.status.is_active() {
            tracing::warn!(
                target: TRACING_TARGET_POLICY,
                subject = %profile.id,
                organization = %organization_id,
                status = %membership.status,
                "membership is not active"
            );
            return Err(Error::inactive_membership()
                .with_message(format!("membership status is {}", membership.status)));
        }

        if let Some(allowed) = allowed
            && !allowed.contains(&membership.role)
        {
            let allowed_names: Vec<&str> = allowed.iter().map(OrgRole::as_ref).collect();
            tracing::warn!(
                target: TRACING_TARGET_POLICY,
                subject = %profile.id,
                organization = %organization_id,
                role = %membership.role,
                allowed = ?allowed_names,
                "stored role is not in the allow-list"
            );
            return Err(Error::insufficient_role().with_message(format!(
                "requires one of [{}], caller holds {}",
                allowed_names.join(", "),
                membership.role
            )));
        }

        tracing::debug!(
            target: TRACING_TARGET_POLICY,
            subject = %profile.id,
            organization = %organization_id,
            role = %membership.role,
            "authorization granted"
        );

        Ok(AuthContext {
            profile: profile.clone(),
            organization_id: Some(organization_id.to_owned()),
            effective_role: membership.role,
        })
    }

    fn bypass_context(profile: &Profile, organization_id: Option<&str>) -> AuthContext {
        AuthContext {
            profile: profile.clone(),
            organization_id: organization_id.map(str::to_owned),
            effective_role: OrgRole::PlatformAdmin,
        }
    }
}

impl std::fmt::Debug for PolicyEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyEngine").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::mock::MockDirectory;
    use crate::types::{Membership, MembershipStatus};

    fn engine(directory: &MockDirectory) -> PolicyEngine {
        PolicyEngine::new(Arc::new(directory.clone()))
    }

    fn member(role: OrgRole, status: MembershipStatus) -> (MockDirectory, Profile) {
        let directory = MockDirectory::new();
        let profile = Profile::new("u1", "u1@example.org");
        directory.insert_membership(Membership::new("o1", "u1", role, status));
        (directory, profile)
    }

    #[tokio::test]
    async fn platform_admin_bypasses_membership() {
        let directory = MockDirectory::new();
        let admin = Profile::new("a1", "root@example.org").with_platform_admin(true);

        let context = engine(&directory)
            .authorize_roles(&admin, Some("o1"), &[OrgRole::Owner])
            .await
            .unwrap();
        assert_eq!(context.effective_role, OrgRole::PlatformAdmin);
        assert_eq!(context.organization_id.as_deref(), Some("o1"));
    }

    #[tokio::test]
    async fn platform_admin_needs_no_org_scope() {
        let directory = MockDirectory::new();
        let admin = Profile::new("a1", "root@example.org").with_platform_admin(true);

        let context = engine(&directory)
            .authorize_member(&admin, None)
            .await
            .unwrap();
        assert_eq!(context.effective_role, OrgRole::PlatformAdmin);
        assert!(context.organization_id.is_none());
    }

    #[tokio::test]
    async fn missing_scope_is_rejected_for_regular_users() {
        let (directory, profile) = member(OrgRole::Owner, MembershipStatus::Active);

        let error = engine(&directory)
            .authorize_member(&profile, None)
            .await
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::MissingOrgContext);
    }

    #[tokio::test]
    async fn non_member_is_rejected() {
        let directory = MockDirectory::new();
        let profile = Profile::new("u2", "u2@example.org");

        let error = engine(&directory)
            .authorize_member(&profile, Some("o1"))
            .await
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::NotAMember);
    }

    #[tokio::test]
    async fn invited_membership_is_inactive() {
        let (directory, profile) = member(OrgRole::Admin, MembershipStatus::Invited);

        let error = engine(&directory)
            .authorize_member(&profile, Some("o1"))
            .await
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::InactiveMembership);
        assert!(error.message.as_deref().unwrap().contains("invited"));
    }

    #[tokio::test]
    async fn role_outside_allow_list_is_insufficient() {
        let (directory, profile) = member(OrgRole::Facilitator, MembershipStatus::Active);

        let error = engine(&directory)
            .authorize_roles(&profile, Some("o1"), &[OrgRole::Owner, OrgRole::Admin])
            .await
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::InsufficientRole);

        let message = error.message.as_deref().unwrap();
        assert!(message.contains("owner"));
        assert!(message.contains("admin"));
        assert!(message.contains("facilitator"));
    }

    #[tokio::test]
    async fn active_member_passes_role_check() {
        let (directory, profile) = member(OrgRole::Owner, MembershipStatus::Active);

        let context = engine(&directory)
            .authorize_roles(&profile, Some("o1"), &[OrgRole::Owner, OrgRole::Admin])
            .await
            .unwrap();
        assert_eq!(context.effective_role, OrgRole::Owner);
        assert_eq!(context.organization_id.as_deref(), Some("o1"));
    }

    #[tokio::test]
    async fn member_check_ignores_role() {
        let (directory, profile) = member(OrgRole::Participant, MembershipStatus::Active);

        let context = engine(&directory)
            .authorize_member(&profile, Some("o1"))
            .await
            .unwrap();
        assert_eq!(context.effective_role, OrgRole::Participant);
    }

    #[tokio::test]
    async fn path_scoped_check_matches_header_scoped_check() {
        let (directory, profile) = member(OrgRole::Admin, MembershipStatus::Active);
        let engine = engine(&directory);
        let allowed = [OrgRole::Owner, OrgRole::Admin];

        let by_header = engine
            .authorize_roles(&profile, Some("o1"), &allowed)
            .await
            .unwrap();
        let by_path = engine.authorize_org(&profile, "o1", &allowed).await.unwrap();
        assert_eq!(by_header, by_path);
    }

    #[tokio::test]
    async fn first_membership_row_wins_on_duplicates() {
        let directory = MockDirectory::new();
        let profile = Profile::new("u1", "u1@example.org");
        directory.insert_membership(Membership::new(
            "o1",
            "u1",
            OrgRole::Admin,
            MembershipStatus::Active,
        ));
        directory.insert_membership(Membership::new(
            "o1",
            "u1",
            OrgRole::Participant,
            MembershipStatus::Active,
        ));

        let context = engine(&directory)
            .authorize_member(&profile, Some("o1"))
            .await
            .unwrap();
        assert_eq!(context.effective_role, OrgRole::Admin);
    }

    #[tokio::test]
    async fn store_fault_is_store_failure() {
        let (directory, profile) = member(OrgRole::Owner, MembershipStatus::Active);
        directory.fail_memberships(true);

        let error = engine(&directory)
            .authorize_member(&profile, Some("o1"))
            .await
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::StoreFailure);
    }

    #[tokio::test]
    async fn require_platform_admin_rejects_regular_users() {
        let (directory, profile) = member(OrgRole::Owner, MembershipStatus::Active);

        let error = engine(&directory)
            .require_platform_admin(&profile)
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::InsufficientRole);

        let admin = Profile::new("a1", "root@example.org").with_platform_admin(true);
        let context = engine(&directory).require_platform_admin(&admin).unwrap();
        assert_eq!(context.effective_role, OrgRole::PlatformAdmin);
        assert!(context.organization_id.is_none());
    }
}
