//! Organization scope extraction from the request headers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::{Error, ErrorKind, Result};

/// Name of the header carrying the organization scope.
pub const ORGANIZATION_HEADER: &str = "x-organization-id";

/// The optional organization scope of a request.
///
/// Absence is not an error at extraction time; whether a scope is required
/// is a policy decision made later, where platform admins are exempt.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgContext(pub Option<String>);

impl OrgContext {
    /// Returns the organization id if the header was present.
    #[inline]
    #[must_use]
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl<S> FromRequestParts<S> for OrgContext
where
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(ORGANIZATION_HEADER) else {
            return Ok(Self(None));
        };

        let organization_id = value.to_str().map_err(|_| {
            ErrorKind::BadRequest
                .with_context(format!("{ORGANIZATION_HEADER} header is not valid UTF-8"))
                .into_static()
        })?;

        Ok(Self(Some(organization_id.to_owned())))
    }
}
