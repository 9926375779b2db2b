//! Key-set fetch abstraction and its HTTP implementation.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use reqwest::Client;
use url::Url;

use crate::TRACING_TARGET_KEYSET;
use crate::error::{BoxedError, Error, Result};

/// Source of identity-provider key material.
///
/// The production implementation is [`HttpKeysetFetcher`]; test suites
/// inject fetchers with scripted failure modes.
#[async_trait]
pub trait KeysetFetch: Send + Sync {
    /// Fetches the current JWKS document.
    ///
    /// # Errors
    ///
    /// Returns the underlying transport or decode fault; the cache decides
    /// whether a stale fallback applies.
    async fn fetch_keys(&self) -> Result<JwkSet, BoxedError>;
}

/// Fetches the JWKS document from a well-known HTTP endpoint.
///
/// The entire fetch (connect, request, body) is bounded by a client-level
/// timeout so no verification ever blocks indefinitely on the identity
/// provider.
pub struct HttpKeysetFetcher {
    http: Client,
    url: Url,
}

impl HttpKeysetFetcher {
    /// Creates a fetcher for the given endpoint with a bounded timeout.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built.
    pub fn new(url: Url, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build().map_err(|e| {
            Error::configuration("failed to build key set HTTP client").with_source(e)
        })?;

        tracing::debug!(
            target: TRACING_TARGET_KEYSET,
            url = %url,
            timeout_secs = timeout.as_secs(),
            "key set fetcher created"
        );

        Ok(Self { http, url })
    }

    /// Returns the endpoint this fetcher reads from.
    #[inline]
    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl KeysetFetch for HttpKeysetFetcher {
    async fn fetch_keys(&self) -> Result<JwkSet, BoxedError> {
        let response = self
            .http
            .get(self.url.clone())
            .send()
            .await?
            .error_for_status()?;

        let keys = response.json::<JwkSet>().await?;
        Ok(keys)
    }
}

impl fmt::Debug for HttpKeysetFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpKeysetFetcher")
            .field("url", &self.url.as_str())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn fetcher_builds_for_configured_endpoint() {
        let url = Url::parse("https://id.example.org/auth/v1/.well-known/jwks.json").unwrap();
        let fetcher = HttpKeysetFetcher::new(url.clone(), Duration::from_secs(10)).unwrap();
        assert_eq!(fetcher.url(), &url);
    }

    #[tokio::test]
    async fn trait_faults_are_boxed_errors() {
        let fetcher: Arc<dyn KeysetFetch> = Arc::new(crate::mock::MockKeysetFetcher::failing());
        let fault = fetcher.fetch_keys().await.unwrap_err();
        assert!(fault.to_string().contains("down"));
    }
}
