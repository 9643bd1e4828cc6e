//! Explicit session context.
//!
//! The core activates only behind an authenticated session. The session is
//! created at login, persisted under the `session_flag` cache key so later
//! invocations can restore it, and destroyed at logout. How the operator
//! authenticates is out of scope; this is the gate, not the protocol.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::{CacheKey, CacheStore};
use crate::error::CacheError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub operator: String,
    pub signed_in_at: DateTime<Utc>,
}

impl Session {
    /// Open a session for `operator` and persist the flag.
    pub fn sign_in(cache: &CacheStore, operator: impl Into<String>) -> Result<Self, CacheError> {
        let session = Self {
            operator: operator.into(),
            signed_in_at: Utc::now(),
        };
        cache.write(CacheKey::SessionFlag, &session)?;
        Ok(session)
    }

    /// Restore the persisted session, if any. A corrupt flag reads as
    /// signed out.
    pub fn restore(cache: &CacheStore) -> Option<Self> {
        cache.read(CacheKey::SessionFlag).ok().flatten()
    }

    /// End the session and clear the persisted flag.
    pub fn sign_out(self, cache: &CacheStore) -> Result<(), CacheError> {
        cache.remove(CacheKey::SessionFlag)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::Session;
    use crate::cache::CacheStore;

    #[test]
    fn sign_in_persists_and_restores() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = CacheStore::open(dir.path()).expect("open");

        let session = Session::sign_in(&cache, "mitu").expect("sign in");
        let restored = Session::restore(&cache).expect("restored");
        assert_eq!(restored, session);
    }

    #[test]
    fn sign_out_clears_the_flag() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = CacheStore::open(dir.path()).expect("open");

        let session = Session::sign_in(&cache, "mitu").expect("sign in");
        session.sign_out(&cache).expect("sign out");
        assert_eq!(Session::restore(&cache), None);
    }
}
