//! Elliptic-curve verification against the identity provider's key set.

use jsonwebtoken::jwk::Jwk;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};

use super::{build_validation, collapse_invalid};
use crate::TRACING_TARGET_VERIFIER;
use crate::claims::TokenClaims;
use crate::error::{Error, Result};
use crate::keyset::KeysetCache;

/// Verifies ES256 signatures with keys from the shared [`KeysetCache`].
///
/// The cache is injected rather than owned so all verifiers in a process
/// share one entry and one refresh schedule.
#[derive(Debug)]
pub struct AsymmetricVerifier {
    keyset: KeysetCache,
    validation: Validation,
}

impl AsymmetricVerifier {
    /// Creates a verifier over the given key cache and expected audience.
    pub fn new(keyset: KeysetCache, audience: &str) -> Self {
        Self {
            keyset,
            validation: build_validation(Algorithm::ES256, audience),
        }
    }

    /// Validates the token signature and claims.
    ///
    /// The signing key is selected by the token's `kid` header when present;
    /// otherwise every cached key is tried.
    ///
    /// # Errors
    ///
    /// * [`ErrorKind::IdentityUnavailable`] when key material cannot be
    ///   obtained from the cache.
    /// * [`ErrorKind::InvalidToken`] for every other failure.
    ///
    /// [`ErrorKind::IdentityUnavailable`]: crate::ErrorKind::IdentityUnavailable
    /// [`ErrorKind::InvalidToken`]: crate::ErrorKind::InvalidToken
    pub async fn verify(&self, token: &str) -> Result<TokenClaims> {
        let header = decode_header(token).map_err(collapse_invalid)?;

        // Cache errors are a dependency fault, not a credential fault.
        let keys = self.keyset.get().await?;

        let candidates: Vec<&Jwk> = match header.kid.as_deref().and_then(|kid| keys.find(kid)) {
            Some(jwk) => vec![jwk],
            None => keys.keys.iter().collect(),
        };

        for jwk in candidates {
            let Ok(decoding_key) = DecodingKey::from_jwk(jwk) else {
                continue;
            };

            match decode::<TokenClaims>(token, &decoding_key, &self.validation) {
                Ok(token_data) => return Ok(token_data.claims),
                Err(error) => {
                    tracing::debug!(
                        target: TRACING_TARGET_VERIFIER,
                        error = %error,
                        "candidate key rejected token"
                    );
                }
            }
        }

        Err(Error::invalid_token())
    }
}
