//! Platform user profiles.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A platform user profile.
///
/// Owned by the external profile store; this core only reads it. The `id`
/// matches the subject claim of the caller's bearer token and is treated as
/// an opaque string (the store owns the identifier format).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Opaque identifier, equal to the token subject.
    pub id: String,
    /// Primary email address.
    pub email: String,
    /// Display name, if the user has set one.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Avatar URL, if the user has set one.
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Platform-admin flag; grants the cross-organization bypass.
    #[serde(default)]
    pub is_platform_admin: bool,
    /// Open key/value bag owned by account-management collaborators.
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Profile {
    /// Creates a minimal profile with the given id and email.
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            display_name: None,
            avatar_url: None,
            is_platform_admin: false,
            metadata: Map::new(),
        }
    }

    /// Sets the platform-admin flag.
    #[must_use]
    pub fn with_platform_admin(mut self, is_platform_admin: bool) -> Self {
        self.is_platform_admin = is_platform_admin;
        self
    }
}
