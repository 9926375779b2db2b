//! Verified bearer token claims.

use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claims carried by a verified bearer token.
///
/// This structure contains the RFC 7519 registered claims this core relies
/// on, plus a bag of provider-specific custom claims. Timestamps are encoded
/// as integer seconds for JWT interoperability.
///
/// Instances live only for the duration of request processing and are never
/// persisted or cached across requests.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct TokenClaims {
    /// Subject: opaque identifier of the authenticated identity.
    #[serde(rename = "sub")]
    pub subject: String,
    /// Audience the token was minted for.
    #[serde(rename = "aud")]
    pub audience: String,
    /// Issued at (as UTC timestamp).
    #[serde(rename = "iat", with = "jiff::fmt::serde::timestamp::second::required")]
    pub issued_at: Timestamp,
    /// Expiration time (as UTC timestamp).
    #[serde(rename = "exp", with = "jiff::fmt::serde::timestamp::second::required")]
    pub expires_at: Timestamp,
    /// Provider-specific claims that this core does not interpret.
    #[serde(flatten)]
    pub custom_claims: Map<String, Value>,
}

impl TokenClaims {
    /// Creates claims for the given subject, valid from now for `lifetime`.
    ///
    /// This core never issues tokens; the constructor exists so callers and
    /// test suites can mint fixtures consistent with what [`verify`] accepts.
    ///
    /// [`verify`]: crate::verifier::TokenVerifier::verify
    pub fn new(
        subject: impl Into<String>,
        audience: impl Into<String>,
        lifetime: SignedDuration,
    ) -> Self {
        // Whole seconds only, matching the integer claim encoding.
        let now = Timestamp::now();
        let issued_at = Timestamp::from_second(now.as_second()).unwrap_or(now);

        // Addition fails only at the timestamp range extremes.
        let expires_at = issued_at.saturating_add(lifetime).unwrap_or(if lifetime.is_negative() {
            Timestamp::MIN
        } else {
            Timestamp::MAX
        });

        Self {
            subject: subject.into(),
            audience: audience.into(),
            issued_at,
            expires_at,
            custom_claims: Map::new(),
        }
    }

    /// Checks if the token has expired based on current UTC time.
    #[inline]
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Timestamp::now()
    }

    /// Returns the remaining lifetime, or zero if already expired.
    #[inline]
    #[must_use]
    pub fn remaining_lifetime(&self) -> SignedDuration {
        let remaining = self.expires_at.duration_since(Timestamp::now());
        remaining.max(SignedDuration::ZERO)
    }
}
