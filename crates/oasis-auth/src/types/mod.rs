//! Core data model shared by the verifier, resolver, and policy engine.

mod context;
mod membership;
mod profile;
mod role;

pub use self::context::AuthContext;
pub use self::membership::{Membership, MembershipStatus};
pub use self::profile::Profile;
pub use self::role::OrgRole;
