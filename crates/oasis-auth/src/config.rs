//! Authentication configuration, read once at startup.

use std::time::Duration;

#[cfg(any(test, feature = "config"))]
use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use url::Url;

use crate::error::{Error, Result};

/// How bearer token signatures are verified.
///
/// Selected once at process configuration time; requests never branch on
/// configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(AsRefStr, Display, EnumString)]
#[derive(Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "config"), derive(ValueEnum))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum VerificationMode {
    /// HMAC (HS256) with a pre-shared secret.
    Symmetric,
    /// Elliptic-curve (ES256) against the identity provider's key set.
    Asymmetric,
}

/// Authentication and authorization core configuration.
///
/// All values can be provided via CLI arguments or environment variables
/// when the `config` feature is enabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "config"), derive(Args))]
pub struct AuthConfig {
    /// Token signature verification mode.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(
            long = "auth-verification-mode",
            env = "AUTH_VERIFICATION_MODE",
            default_value = "asymmetric",
            value_enum
        )
    )]
    #[serde(default = "AuthConfig::default_verification_mode")]
    pub verification_mode: VerificationMode,

    /// Pre-shared secret for symmetric verification (required iff symmetric).
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long = "auth-shared-secret", env = "AUTH_SHARED_SECRET")
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_secret: Option<String>,

    /// Audience tokens must be minted for.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(
            long = "auth-audience",
            env = "AUTH_AUDIENCE",
            default_value = "authenticated"
        )
    )]
    #[serde(default = "AuthConfig::default_audience")]
    pub audience: String,

    /// Base URL of the identity provider (used to derive the key-set URL).
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long = "auth-identity-provider-url", env = "AUTH_IDENTITY_PROVIDER_URL")
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_provider_url: Option<Url>,

    /// Explicit key-set endpoint, overriding the derived one.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long = "auth-jwks-url", env = "AUTH_JWKS_URL")
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwks_url: Option<Url>,

    /// Time-to-live of cached key material, in seconds.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(
            long = "auth-keyset-ttl-secs",
            env = "AUTH_KEYSET_TTL_SECS",
            default_value = "3600"
        )
    )]
    #[serde(default = "AuthConfig::default_keyset_ttl_secs")]
    pub keyset_ttl_secs: u64,

    /// Upper bound on a single key-set fetch, in seconds.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(
            long = "auth-keyset-fetch-timeout-secs",
            env = "AUTH_KEYSET_FETCH_TIMEOUT_SECS",
            default_value = "10"
        )
    )]
    #[serde(default = "AuthConfig::default_keyset_fetch_timeout_secs")]
    pub keyset_fetch_timeout_secs: u64,
}

impl AuthConfig {
    fn default_verification_mode() -> VerificationMode {
        VerificationMode::Asymmetric
    }

    fn default_audience() -> String {
        "authenticated".to_owned()
    }

    fn default_keyset_ttl_secs() -> u64 {
        3600
    }

    fn default_keyset_fetch_timeout_secs() -> u64 {
        10
    }

    /// Creates a symmetric-mode configuration with the default audience.
    pub fn symmetric(shared_secret: impl Into<String>) -> Self {
        Self {
            verification_mode: VerificationMode::Symmetric,
            shared_secret: Some(shared_secret.into()),
            audience: Self::default_audience(),
            identity_provider_url: None,
            jwks_url: None,
            keyset_ttl_secs: Self::default_keyset_ttl_secs(),
            keyset_fetch_timeout_secs: Self::default_keyset_fetch_timeout_secs(),
        }
    }

    /// Creates an asymmetric-mode configuration with the default audience.
    pub fn asymmetric(identity_provider_url: Url) -> Self {
        Self {
            verification_mode: VerificationMode::Asymmetric,
            shared_secret: None,
            audience: Self::default_audience(),
            identity_provider_url: Some(identity_provider_url),
            jwks_url: None,
            keyset_ttl_secs: Self::default_keyset_ttl_secs(),
            keyset_fetch_timeout_secs: Self::default_keyset_fetch_timeout_secs(),
        }
    }

    /// Replaces the expected audience.
    #[must_use]
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = audience.into();
        self
    }

    /// Validates all configuration values.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the selected mode is missing its
    /// required material. Absence of the symmetric secret is fatal here, not
    /// per request.
    pub fn validate(&self) -> Result<()> {
        if self.audience.is_empty() {
            return Err(Error::configuration("audience must not be empty"));
        }

        match self.verification_mode {
            VerificationMode::Symmetric => {
                if self.shared_secret.as_deref().is_none_or(str::is_empty) {
                    return Err(Error::configuration(
                        "symmetric verification requires a shared secret",
                    ));
                }
            }
            VerificationMode::Asymmetric => {
                self.keyset_url()?;
            }
        }

        Ok(())
    }

    /// Resolves the key-set endpoint.
    ///
    /// Uses the explicit JWKS URL when configured, otherwise derives the
    /// provider's well-known location from the base URL.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when neither URL is available.
    pub fn keyset_url(&self) -> Result<Url> {
        if let Some(url) = &self.jwks_url {
            return Ok(url.clone());
        }

        let base = self.identity_provider_url.as_ref().ok_or_else(|| {
            Error::configuration(
                "asymmetric verification requires a JWKS URL or an identity provider URL",
            )
        })?;

        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|()| Error::configuration("identity provider URL cannot be a base"))?
            .pop_if_empty()
            .extend(["auth", "v1", ".well-known", "jwks.json"]);

        Ok(url)
    }

    /// Returns the key-set TTL as a duration.
    #[inline]
    #[must_use]
    pub fn keyset_ttl(&self) -> Duration {
        Duration::from_secs(self.keyset_ttl_secs)
    }

    /// Returns the key-set fetch timeout as a duration.
    #[inline]
    #[must_use]
    pub fn keyset_fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.keyset_fetch_timeout_secs)
    }
}
