//! Dual-mode bearer token verification.
//!
//! The strategy is a tagged variant selected once at construction from
//! [`AuthConfig`]; request handling never branches on configuration. Every
//! structural, signature, expiry, or audience failure collapses to a single
//! [`ErrorKind::InvalidToken`] outcome so callers cannot probe which check
//! failed; the detail is logged instead. Key-cache faults are the one
//! exception: they surface as [`ErrorKind::IdentityUnavailable`], a
//! 503-class dependency fault rather than a 401-class credential fault.
//!
//! [`ErrorKind::InvalidToken`]: crate::ErrorKind::InvalidToken
//! [`ErrorKind::IdentityUnavailable`]: crate::ErrorKind::IdentityUnavailable

mod asymmetric;
mod symmetric;

use jsonwebtoken::{Algorithm, Validation};

pub use self::asymmetric::AsymmetricVerifier;
pub use self::symmetric::SymmetricVerifier;
use crate::TRACING_TARGET_VERIFIER;
use crate::claims::TokenClaims;
use crate::config::{AuthConfig, VerificationMode};
use crate::error::{Error, Result};
use crate::keyset::KeysetCache;

/// Verifies bearer tokens with the strategy configured at startup.
#[derive(Debug)]
pub enum TokenVerifier {
    /// HMAC verification with a pre-shared secret.
    Symmetric(SymmetricVerifier),
    /// Elliptic-curve verification against the cached identity-provider keys.
    Asymmetric(AsymmetricVerifier),
}

impl TokenVerifier {
    /// Builds the configured verification strategy.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the selected mode is missing its
    /// required material (e.g. symmetric mode without a shared secret).
    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        config.validate()?;

        match config.verification_mode {
            VerificationMode::Symmetric => {
                // validate() guarantees the secret is present and non-empty.
                let secret = config.shared_secret.as_deref().ok_or_else(|| {
                    Error::configuration("symmetric verification requires a shared secret")
                })?;

                Ok(Self::Symmetric(SymmetricVerifier::new(
                    secret,
                    &config.audience,
                )))
            }
            VerificationMode::Asymmetric => {
                let keyset = KeysetCache::from_config(config)?;
                Ok(Self::Asymmetric(AsymmetricVerifier::new(
                    keyset,
                    &config.audience,
                )))
            }
        }
    }

    /// Validates a raw bearer token and returns its claims.
    ///
    /// # Errors
    ///
    /// * [`ErrorKind::InvalidToken`] for any structural, signature, expiry,
    ///   or audience failure.
    /// * [`ErrorKind::IdentityUnavailable`] when key material cannot be
    ///   obtained in asymmetric mode.
    ///
    /// [`ErrorKind::InvalidToken`]: crate::ErrorKind::InvalidToken
    /// [`ErrorKind::IdentityUnavailable`]: crate::ErrorKind::IdentityUnavailable
    pub async fn verify(&self, token: &str) -> Result<TokenClaims> {
        let claims = match self {
            Self::Symmetric(verifier) => verifier.verify(token)?,
            Self::Asymmetric(verifier) => verifier.verify(token).await?,
        };

        // Belt-and-suspenders expiry check on top of the library validation.
        if claims.is_expired() {
            tracing::warn!(
                target: TRACING_TARGET_VERIFIER,
                subject = %claims.subject,
                expired_at = %claims.expires_at,
                "token verification failed: token expired"
            );
            return Err(Error::invalid_token());
        }

        tracing::debug!(
            target: TRACING_TARGET_VERIFIER,
            subject = %claims.subject,
            remaining = ?claims.remaining_lifetime(),
            "token verification completed"
        );

        Ok(claims)
    }
}

/// Builds the strict validation settings shared by both strategies.
pub(crate) fn build_validation(algorithm: Algorithm, audience: &str) -> Validation {
    let mut validation = Validation::new(algorithm);
    validation.validate_exp = true;
    validation.validate_nbf = false; // Not Before claim not used
    validation.validate_aud = true;
    validation.set_audience(&[audience]);
    validation.set_required_spec_claims(&["sub", "aud", "exp", "iat"]);
    validation
}

/// Collapses a library verification failure into the opaque invalid-token error.
pub(crate) fn collapse_invalid(error: jsonwebtoken::errors::Error) -> Error {
    tracing::debug!(
        target: TRACING_TARGET_VERIFIER,
        error = %error,
        "token verification failed"
    );

    Error::invalid_token().with_source(error)
}
