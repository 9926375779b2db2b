//! HMAC verification with a pre-shared secret.

use std::fmt;

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use super::{build_validation, collapse_invalid};
use crate::claims::TokenClaims;
use crate::error::Result;

/// Verifies HS256 signatures with a pre-shared secret.
///
/// The secret is turned into a decoding key once at construction; absence of
/// the secret is rejected earlier, at configuration validation.
pub struct SymmetricVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl SymmetricVerifier {
    /// Creates a verifier from the shared secret and expected audience.
    pub fn new(shared_secret: &str, audience: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(shared_secret.as_bytes()),
            validation: build_validation(Algorithm::HS256, audience),
        }
    }

    /// Validates the token signature and claims.
    ///
    /// # Errors
    ///
    /// Any failure collapses to [`ErrorKind::InvalidToken`].
    ///
    /// [`ErrorKind::InvalidToken`]: crate::ErrorKind::InvalidToken
    pub fn verify(&self, token: &str) -> Result<TokenClaims> {
        let token_data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(collapse_invalid)?;

        Ok(token_data.claims)
    }
}

impl fmt::Debug for SymmetricVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymmetricVerifier").finish_non_exhaustive()
    }
}
