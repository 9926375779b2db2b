//! Self-refreshing cache for identity-provider key material.
//!
//! The cache is the only shared mutable state in this core. It holds the
//! last-fetched JWKS document together with its fetch timestamp, swapped as
//! a single unit so a timestamp from one fetch can never be observed paired
//! with key material from another. Stale material is served as a fallback
//! when a refresh fails, so verification keeps working through an identity
//! provider outage; the cache only fails when it has never been populated
//! and the fetch fails too.

mod fetcher;

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::jwk::JwkSet;
use tokio::sync::RwLock;

pub use self::fetcher::{HttpKeysetFetcher, KeysetFetch};
use crate::TRACING_TARGET_KEYSET;
use crate::config::AuthConfig;
use crate::error::{Error, Result};

/// A fetched JWKS document and the instant it was obtained.
///
/// Timestamp and key material are replaced together under one write lock.
#[derive(Debug, Clone)]
struct KeysetEntry {
    keys: JwkSet,
    fetched_at: Instant,
}

struct KeysetCacheInner {
    entry: RwLock<Option<KeysetEntry>>,
    fetcher: Arc<dyn KeysetFetch>,
    ttl: Duration,
}

/// Shared, self-refreshing cache of identity-provider public keys.
///
/// Cloning is cheap; all clones share one entry through `Arc`. Concurrent
/// requests observing a stale entry may each trigger a refresh; duplicate
/// in-flight fetches are tolerated (the fetch is idempotent and the last
/// writer wins), so no lock is held across the fetch await.
#[derive(Clone)]
pub struct KeysetCache {
    inner: Arc<KeysetCacheInner>,
}

impl KeysetCache {
    /// Default time-to-live for fetched key material.
    pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

    /// Creates a cache over the given fetcher.
    pub fn new(fetcher: Arc<dyn KeysetFetch>, ttl: Duration) -> Self {
        Self {
            inner: Arc::new(KeysetCacheInner {
                entry: RwLock::new(None),
                fetcher,
                ttl,
            }),
        }
    }

    /// Creates a cache backed by an HTTP fetch of the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no key-set endpoint can be resolved
    /// or the HTTP client cannot be built.
    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        let fetcher = HttpKeysetFetcher::new(config.keyset_url()?, config.keyset_fetch_timeout())?;
        Ok(Self::new(Arc::new(fetcher), config.keyset_ttl()))
    }

    /// Returns current key material, refreshing it when absent or stale.
    ///
    /// On refresh failure a previously fetched document is returned with a
    /// degradation warning.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::IdentityUnavailable`] only when the cache has
    /// never been populated and the fetch fails.
    ///
    /// [`ErrorKind::IdentityUnavailable`]: crate::ErrorKind::IdentityUnavailable
    pub async fn get(&self) -> Result<JwkSet> {
        {
            let entry = self.inner.entry.read().await;
            if let Some(entry) = entry.as_ref()
                && entry.fetched_at.elapsed() <= self.inner.ttl
            {
                return Ok(entry.keys.clone());
            }
        }

        match self.inner.fetcher.fetch_keys().await {
            Ok(keys) => {
                tracing::debug!(
                    target: TRACING_TARGET_KEYSET,
                    key_count = keys.keys.len(),
                    "key set refreshed"
                );

                let entry = KeysetEntry {
                    keys: keys.clone(),
                    fetched_at: Instant::now(),
                };
                *self.inner.entry.write().await = Some(entry);

                Ok(keys)
            }
            Err(fetch_error) => {
                let entry = self.inner.entry.read().await;
                if let Some(entry) = entry.as_ref() {
                    tracing::warn!(
                        target: TRACING_TARGET_KEYSET,
                        error = %fetch_error,
                        stale_for_secs = entry.fetched_at.elapsed().as_secs(),
                        "key set refresh failed, serving stale key material"
                    );

                    return Ok(entry.keys.clone());
                }

                tracing::error!(
                    target: TRACING_TARGET_KEYSET,
                    error = %fetch_error,
                    "key set fetch failed with no cached material available"
                );

                Err(Error::identity_unavailable()
                    .with_message("identity provider key set could not be fetched")
                    .with_source(fetch_error))
            }
        }
    }

    /// Resets the cache to empty, forcing a fetch on the next [`get`].
    ///
    /// [`get`]: Self::get
    pub async fn clear(&self) {
        *self.inner.entry.write().await = None;

        tracing::debug!(target: TRACING_TARGET_KEYSET, "key set cache cleared");
    }
}

impl fmt::Debug for KeysetCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeysetCache")
            .field("ttl", &self.inner.ttl)
            .finish_non_exhaustive()
    }
}
