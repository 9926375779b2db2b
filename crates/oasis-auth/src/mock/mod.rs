//! In-memory test doubles for the store traits and the key-set fetcher.
//!
//! Available to downstream crates through the `test-utils` feature so their
//! integration tests can exercise the full stack without a database or an
//! identity provider.

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;

use crate::error::BoxedError;
use crate::keyset::KeysetFetch;
use crate::store::{MembershipStore, ProfileStore};
use crate::types::{Membership, Profile};

#[derive(Default)]
struct DirectoryState {
    profiles: HashMap<String, Profile>,
    memberships: Vec<Membership>,
    fail_profiles: bool,
    fail_memberships: bool,
}

/// In-memory profile and membership directory.
///
/// Memberships keep insertion order, so duplicate rows reproduce the
/// first-row-wins contract of the store traits. Either store can be switched
/// into a failing state to simulate storage faults.
#[derive(Clone, Default)]
pub struct MockDirectory {
    state: Arc<RwLock<DirectoryState>>,
}

impl MockDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a profile, replacing any existing one with the same id.
    pub fn insert_profile(&self, profile: Profile) {
        let mut state = self.state.write().unwrap();
        state.profiles.insert(profile.id.clone(), profile);
    }

    /// Appends a membership row.
    pub fn insert_membership(&self, membership: Membership) {
        self.state.write().unwrap().memberships.push(membership);
    }

    /// Makes every profile read fail when `fail` is `true`.
    pub fn fail_profiles(&self, fail: bool) {
        self.state.write().unwrap().fail_profiles = fail;
    }

    /// Makes every membership read fail when `fail` is `true`.
    pub fn fail_memberships(&self, fail: bool) {
        self.state.write().unwrap().fail_memberships = fail;
    }
}

#[async_trait]
impl ProfileStore for MockDirectory {
    async fn find_profile(&self, user_id: &str) -> Result<Option<Profile>, BoxedError> {
        let state = self.state.read().unwrap();
        if state.fail_profiles {
            return Err(Box::new(io::Error::other("profile store is down")));
        }

        Ok(state.profiles.get(user_id).cloned())
    }
}

#[async_trait]
impl MembershipStore for MockDirectory {
    async fn find_membership(
        &self,
        user_id: &str,
        organization_id: &str,
    ) -> Result<Option<Membership>, BoxedError> {
        let state = self.state.read().unwrap();
        if state.fail_memberships {
            return Err(Box::new(io::Error::other("membership store is down")));
        }

        Ok(state
            .memberships
            .iter()
            .find(|m| m.user_id == user_id && m.organization_id == organization_id)
            .cloned())
    }
}

impl std::fmt::Debug for MockDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockDirectory").finish_non_exhaustive()
    }
}

/// Scripted key-set fetcher.
///
/// Serves a fixed JWKS document, counts fetch attempts, and can be flipped
/// into a failing state to exercise the cache's stale-fallback path.
#[derive(Debug)]
pub struct MockKeysetFetcher {
    keys: JwkSet,
    fail: AtomicBool,
    fetches: AtomicUsize,
}

impl MockKeysetFetcher {
    /// Creates a fetcher that serves the given document.
    #[must_use]
    pub fn new(keys: JwkSet) -> Self {
        Self {
            keys,
            fail: AtomicBool::new(false),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Creates a fetcher whose every fetch fails.
    #[must_use]
    pub fn failing() -> Self {
        let fetcher = Self::new(JwkSet { keys: Vec::new() });
        fetcher.fail.store(true, Ordering::SeqCst);
        fetcher
    }

    /// Switches the failing state.
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Returns how many fetches were attempted, including failed ones.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Returns a key set holding one P-256 public key (RFC 7515 appendix A.3).
    ///
    /// Public key only; useful for exercising key selection and rejection
    /// paths, not for minting tokens.
    #[must_use]
    pub fn p256_test_keys() -> JwkSet {
        serde_json::from_value(serde_json::json!({
            "keys": [{
                "kty": "EC",
                "crv": "P-256",
                "kid": "test-p256",
                "x": "f83OJ3D2xF1Bg8vub9tLe1gHMzV76e8Tus9uPHvRVEU",
                "y": "x_FEzRu9m36HLN_tue659LNpXW6pCyStikYjKIWI5a0",
                "use": "sig",
                "alg": "ES256"
            }]
        }))
        .expect("static test JWKS must parse")
    }
}

#[async_trait]
impl KeysetFetch for MockKeysetFetcher {
    async fn fetch_keys(&self) -> Result<JwkSet, BoxedError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        if self.fail.load(Ordering::SeqCst) {
            return Err(Box::new(io::Error::other("identity provider is down")));
        }

        Ok(self.keys.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn directory_first_row_wins() {
        use crate::types::{MembershipStatus, OrgRole};

        let directory = MockDirectory::new();
        directory.insert_membership(Membership::new(
            "o1",
            "u1",
            OrgRole::Owner,
            MembershipStatus::Active,
        ));
        directory.insert_membership(Membership::new(
            "o1",
            "u1",
            OrgRole::Participant,
            MembershipStatus::Active,
        ));

        let membership = directory.find_membership("u1", "o1").await.unwrap().unwrap();
        assert_eq!(membership.role, OrgRole::Owner);
    }

    #[tokio::test]
    async fn fetcher_counts_failed_attempts() {
        let fetcher = MockKeysetFetcher::new(MockKeysetFetcher::p256_test_keys());
        assert!(fetcher.fetch_keys().await.is_ok());

        fetcher.set_fail(true);
        assert!(fetcher.fetch_keys().await.is_err());
        assert_eq!(fetcher.fetch_count(), 2);
    }

    #[test]
    fn static_jwks_parses_with_one_key() {
        let keys = MockKeysetFetcher::p256_test_keys();
        assert_eq!(keys.keys.len(), 1);
        assert!(keys.find("test-p256").is_some());
    }
}
