//! Raw bearer token extraction from the `Authorization` header.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use axum_extra::typed_header::TypedHeaderRejectionReason;

use crate::error::{Error, ErrorKind, Result};

/// The raw bearer token from the `Authorization` header.
///
/// Extraction distinguishes a missing header from a malformed one so the
/// client gets an actionable 401; the token itself is not validated here.
#[must_use]
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl BearerToken {
    /// Returns the raw token string.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|rejection| match rejection.reason() {
                    TypedHeaderRejectionReason::Missing => ErrorKind::MissingAuthToken.into_error(),
                    _ => ErrorKind::MalformedAuthToken.into_error(),
                })?;

        Ok(Self(bearer.token().to_owned()))
    }
}
