//! Organization roles and the role hierarchy comparator.
//!
//! The comparator functions are pure and perform no lookups, so they can be
//! reused anywhere a role decision is needed (e.g. validating a
//! membership-update request body) without an extra store round-trip.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

/// A caller's role, either within one organization or platform-wide.
///
/// [`PlatformAdmin`] is virtual: it is never stored in a membership record
/// and is derived from [`Profile::is_platform_admin`] instead. The remaining
/// variants are the stored membership roles. [`Unknown`] absorbs role strings
/// this build does not recognize; it ranks below every known role.
///
/// [`PlatformAdmin`]: OrgRole::PlatformAdmin
/// [`Unknown`]: OrgRole::Unknown
/// [`Profile::is_platform_admin`]: crate::types::Profile::is_platform_admin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OrgRole {
    /// Unrestricted cross-organization access (derived, never stored).
    PlatformAdmin,
    /// Full control of their organization.
    Owner,
    /// Operational management, can invite members.
    Admin,
    /// Staff, can view participant progress.
    Facilitator,
    /// End user, access to content and journeys.
    Participant,
    /// A role string this build does not recognize.
    #[serde(other)]
    Unknown,
}

impl OrgRole {
    /// Returns the numeric rank used for hierarchy comparisons.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::PlatformAdmin => 100,
            Self::Owner => 50,
            Self::Admin => 40,
            Self::Facilitator => 30,
            Self::Participant => 20,
            Self::Unknown => 0,
        }
    }

    /// Checks whether this role can manage (modify or remove) a target role.
    ///
    /// Platform admins can manage anyone; otherwise a strictly greater rank
    /// is required, so equal ranks (including self-rank ties) cannot manage
    /// each other.
    #[must_use]
    pub const fn can_manage(self, target: Self) -> bool {
        if matches!(self, Self::PlatformAdmin) {
            return true;
        }
        self.rank() > target.rank()
    }

    /// Checks whether this role can assign `new_role` to a member.
    ///
    /// Platform admins and owners can assign any role; admins can assign
    /// only facilitator and participant; no one else can assign roles.
    #[must_use]
    pub const fn can_assign(self, new_role: Self) -> bool {
        match self {
            Self::PlatformAdmin | Self::Owner => true,
            Self::Admin => matches!(new_role, Self::Facilitator | Self::Participant),
            _ => false,
        }
    }
}
