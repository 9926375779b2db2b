//! HTTP error handling for the authentication boundary.
//!
//! Every failure the core can produce maps to exactly one HTTP status here.
//! Credential failures stay opaque: the response for an invalid token never
//! says which verification check failed.

mod response;

use std::borrow::Cow;
use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

pub use self::response::ErrorResponse;

/// The error type for HTTP handlers at the authentication boundary.
#[derive(Clone)]
#[must_use = "errors do nothing unless serialized"]
pub struct Error<'a> {
    kind: ErrorKind,
    message: Option<Cow<'a, str>>,
    context: Option<Cow<'a, str>>,
}

impl Error<'static> {
    /// Creates a new [`Error`] with the specified kind.
    #[inline]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            context: None,
        }
    }
}

impl<'a> Error<'a> {
    /// Sets a custom user-facing message.
    #[inline]
    pub fn with_message(self, message: impl Into<Cow<'a, str>>) -> Self {
        Self {
            message: Some(message.into()),
            ..self
        }
    }

    /// Attaches diagnostic context to the error.
    #[inline]
    pub fn with_context(self, context: impl Into<Cow<'a, str>>) -> Self {
        Self {
            context: Some(context.into()),
            ..self
        }
    }

    /// Returns the error kind.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the custom message if present.
    #[inline]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns the context if present.
    #[inline]
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Converts this error into a static version by cloning borrowed data.
    pub fn into_static(self) -> Error<'static> {
        Error {
            kind: self.kind,
            message: self.message.map(|m| Cow::Owned(m.into_owned())),
            context: self.context.map(|c| Cow::Owned(c.into_owned())),
        }
    }
}

impl Default for Error<'static> {
    #[inline]
    fn default() -> Self {
        Self::new(ErrorKind::default())
    }
}

impl fmt::Debug for Error<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("kind", &self.kind)
            .field("status", &self.kind.status_code())
            .field("message", &self.message)
            .field("context", &self.context)
            .finish()
    }
}

impl fmt::Display for Error<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let response = self.kind.response();
        write!(f, "{} ({})", response.name, response.status)?;

        if let Some(ref message) = self.message {
            write!(f, ": {message}")?;
        }

        if let Some(ref context) = self.context {
            write!(f, " - {context}")?;
        }

        Ok(())
    }
}

impl std::error::Error for Error<'_> {}

impl IntoResponse for Error<'_> {
    fn into_response(self) -> Response {
        let mut response = self.kind.response();

        if let Some(message) = self.message {
            response = response.with_message(message);
        }

        if let Some(context) = self.context {
            response = response.with_context(context);
        }

        response.into_response()
    }
}

impl From<ErrorKind> for Error<'static> {
    #[inline]
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl From<oasis_auth::Error> for Error<'static> {
    fn from(error: oasis_auth::Error) -> Self {
        use oasis_auth::ErrorKind as AuthErrorKind;

        let kind = match error.kind {
            // Opaque on purpose: the caller never learns which check failed.
            AuthErrorKind::InvalidToken => return Self::new(ErrorKind::Unauthorized),
            AuthErrorKind::MissingSubject => ErrorKind::Unauthorized,
            AuthErrorKind::ProfileNotFound => ErrorKind::NotFound,
            AuthErrorKind::MissingOrgContext => ErrorKind::BadRequest,
            AuthErrorKind::NotAMember
            | AuthErrorKind::InactiveMembership
            | AuthErrorKind::InsufficientRole => ErrorKind::Forbidden,
            AuthErrorKind::IdentityUnavailable => ErrorKind::ServiceUnavailable,
            AuthErrorKind::StoreFailure | AuthErrorKind::Configuration => {
                ErrorKind::InternalServerError
            }
        };

        match error.message {
            Some(message) => Self::new(kind).with_context(message),
            None => Self::new(kind),
        }
    }
}

/// A specialized [`Result`] type for HTTP handlers.
///
/// [`Result`]: std::result::Result
pub type Result<T, E = Error<'static>> = std::result::Result<T, E>;

/// All HTTP error kinds the authentication boundary produces.
#[must_use = "error kinds do nothing unless used to create errors"]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    // 4xx Client Errors
    /// 400 Bad Request - Invalid or missing request data
    BadRequest,
    /// 401 Unauthorized - Missing authentication token
    MissingAuthToken,
    /// 401 Unauthorized - Malformed authentication token
    MalformedAuthToken,
    /// 401 Unauthorized - Invalid credentials
    Unauthorized,
    /// 403 Forbidden - Access denied
    Forbidden,
    /// 404 Not Found - Resource not found
    NotFound,

    // 5xx Server Errors
    /// 500 Internal Server Error - Unexpected server error
    #[default]
    InternalServerError,
    /// 503 Service Unavailable - Dependency outage
    ServiceUnavailable,
}

impl ErrorKind {
    /// Converts this error kind into a full [`Error`].
    #[inline]
    pub fn into_error(self) -> Error<'static> {
        Error::new(self)
    }

    /// Creates an [`Error`] with the specified message.
    #[inline]
    pub fn with_message<'a>(self, message: impl Into<Cow<'a, str>>) -> Error<'a> {
        Error::new(self).with_message(message)
    }

    /// Creates an [`Error`] with the specified context.
    #[inline]
    pub fn with_context<'a>(self, context: impl Into<Cow<'a, str>>) -> Error<'a> {
        Error::new(self).with_context(context)
    }

    /// Returns the HTTP status code for this error kind.
    #[inline]
    pub fn status_code(self) -> StatusCode {
        self.response().status
    }

    /// Returns the canned response for this error kind.
    #[inline]
    pub fn response(self) -> ErrorResponse<'static> {
        match self {
            Self::BadRequest => ErrorResponse::BAD_REQUEST,
            Self::MissingAuthToken => ErrorResponse::MISSING_AUTH_TOKEN,
            Self::MalformedAuthToken => ErrorResponse::MALFORMED_AUTH_TOKEN,
            Self::Unauthorized => ErrorResponse::UNAUTHORIZED,
            Self::Forbidden => ErrorResponse::FORBIDDEN,
            Self::NotFound => ErrorResponse::NOT_FOUND,
            Self::InternalServerError => ErrorResponse::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable => ErrorResponse::SERVICE_UNAVAILABLE,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.response().name.as_ref())
    }
}

impl IntoResponse for ErrorKind {
    #[inline]
    fn into_response(self) -> Response {
        self.response().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_per_kind() {
        assert_eq!(ErrorKind::BadRequest.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorKind::MissingAuthToken.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ErrorKind::MalformedAuthToken.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ErrorKind::Unauthorized.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ErrorKind::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorKind::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorKind::InternalServerError.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ErrorKind::ServiceUnavailable.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn invalid_token_maps_to_opaque_unauthorized() {
        let error: Error<'_> =
            oasis_auth::Error::invalid_token().with_message("signature mismatch").into();

        assert_eq!(error.kind(), ErrorKind::Unauthorized);
        assert!(error.context().is_none());
        assert!(error.message().is_none());
    }

    #[test]
    fn policy_denials_map_to_forbidden_with_context() {
        let error: Error<'_> = oasis_auth::Error::insufficient_role()
            .with_message("requires one of [owner], caller holds participant")
            .into();

        assert_eq!(error.kind(), ErrorKind::Forbidden);
        assert_eq!(
            error.context(),
            Some("requires one of [owner], caller holds participant")
        );
    }

    #[test]
    fn dependency_faults_map_to_5xx() {
        let store: Error<'_> = oasis_auth::Error::store_failure().into();
        assert_eq!(store.kind(), ErrorKind::InternalServerError);

        let keys: Error<'_> = oasis_auth::Error::identity_unavailable().into();
        assert_eq!(keys.kind(), ErrorKind::ServiceUnavailable);
    }

    #[test]
    fn missing_org_scope_is_bad_request() {
        let error: Error<'_> = oasis_auth::Error::missing_org_context().into();
        assert_eq!(error.kind(), ErrorKind::BadRequest);
    }

    #[test]
    fn missing_profile_is_not_found() {
        let error: Error<'_> = oasis_auth::Error::profile_not_found().into();
        assert_eq!(error.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn error_builder_chaining() {
        let error = ErrorKind::Forbidden
            .with_message("Access denied")
            .with_context("organization o1");

        assert_eq!(error.kind(), ErrorKind::Forbidden);
        assert_eq!(error.message(), Some("Access denied"));
        assert_eq!(error.context(), Some("organization o1"));

        let display = error.to_string();
        assert!(display.contains("forbidden"));
        assert!(display.contains("403"));
    }

    #[test]
    fn error_into_static() {
        let message = String::from("scoped message");
        let error = ErrorKind::BadRequest.with_message(message.as_str());
        let static_error = error.into_static();
        assert_eq!(static_error.message(), Some("scoped message"));
    }
}
