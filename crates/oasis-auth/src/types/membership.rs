//! Organization membership records.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

use super::OrgRole;

/// Lifecycle status of a membership.
///
/// Only [`Active`] memberships grant access; every other status is reported
/// to the caller as an inactive membership, carrying the actual status for
/// diagnostics.
///
/// [`Active`]: MembershipStatus::Active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MembershipStatus {
    /// Membership is in good standing.
    Active,
    /// Invitation issued but not yet accepted.
    Invited,
    /// Membership suspended by an organization manager.
    Suspended,
    /// A status string this build does not recognize.
    #[serde(other)]
    Unknown,
}

impl MembershipStatus {
    /// Returns `true` if this status grants access.
    #[inline]
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

/// The relationship between a user and an organization.
///
/// Owned by the external membership store; this core only reads it. At most
/// one active membership per (user, organization) pair is meaningful; stores
/// return the first matching row when duplicates exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    /// Organization the membership belongs to.
    pub organization_id: String,
    /// Member's user id (matches [`Profile::id`]).
    ///
    /// [`Profile::id`]: crate::types::Profile::id
    pub user_id: String,
    /// Stored role within the organization.
    pub role: OrgRole,
    /// Lifecycle status.
    pub status: MembershipStatus,
}

impl Membership {
    /// Creates a membership record.
    pub fn new(
        organization_id: impl Into<String>,
        user_id: impl Into<String>,
        role: OrgRole,
        status: MembershipStatus,
    ) -> Self {
        Self {
            organization_id: organization_id.into(),
            user_id: user_id.into(),
            role,
            status,
        }
    }
}
