//! Durable local cache of the current record set.
//!
//! One JSON snapshot file per logical key under the data directory. The
//! store is synchronous and never suspends; the sync coordinator is its
//! only writer. Writes go through a temp file and rename so a crash never
//! leaves a half-written snapshot behind.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::CacheError;

/// Logical cache entry names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKey {
    Clients,
    Contacts,
    StudioProfile,
    StorageMode,
    SessionFlag,
}

impl CacheKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Clients => "clients",
            Self::Contacts => "contacts",
            Self::StudioProfile => "studio_profile",
            Self::StorageMode => "storage_mode",
            Self::SessionFlag => "session_flag",
        }
    }
}

/// Key-value snapshot store rooted at the data directory.
#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    /// Open (creating if needed) the cache directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| CacheError::Io {
            key: "cache root",
            source,
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: CacheKey) -> PathBuf {
        self.root.join(format!("{}.json", key.as_str()))
    }

    /// Read a snapshot. Absent file is `Ok(None)`; an unparseable file is
    /// `CacheError::Corrupt` for the caller to decide on.
    pub fn read<T: DeserializeOwned>(&self, key: CacheKey) -> Result<Option<T>, CacheError> {
        let raw = match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(CacheError::Io {
                    key: key.as_str(),
                    source,
                });
            }
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|err| CacheError::Corrupt {
                key: key.as_str(),
                reason: err.to_string(),
            })
    }

    /// Read a snapshot, falling back to the default value on absence or
    /// corruption. Corruption is logged, not surfaced; an empty collection
    /// is a valid initial state.
    pub fn read_or_default<T: DeserializeOwned + Default>(&self, key: CacheKey) -> T {
        match self.read(key) {
            Ok(Some(value)) => value,
            Ok(None) => T::default(),
            Err(err) => {
                warn!(key = key.as_str(), error = %err, "cache snapshot unusable, starting empty");
                T::default()
            }
        }
    }

    /// Replace a snapshot atomically.
    pub fn write<T: Serialize>(&self, key: CacheKey, value: &T) -> Result<(), CacheError> {
        let body = serde_json::to_vec_pretty(value).map_err(|err| CacheError::Corrupt {
            key: key.as_str(),
            reason: err.to_string(),
        })?;
        let tmp = self.root.join(format!(".{}.json.tmp", key.as_str()));
        fs::write(&tmp, body).map_err(|source| CacheError::Io {
            key: key.as_str(),
            source,
        })?;
        fs::rename(&tmp, self.path_for(key)).map_err(|source| CacheError::Io {
            key: key.as_str(),
            source,
        })
    }

    /// Delete a snapshot. Missing files are fine.
    pub fn remove(&self, key: CacheKey) -> Result<(), CacheError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(CacheError::Io {
                key: key.as_str(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{CacheKey, CacheStore};
    use crate::error::CacheError;
    use crate::model::ContactRecord;

    #[test]
    fn snapshots_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = CacheStore::open(dir.path()).expect("open");

        let contacts = vec![ContactRecord::new("Studio Lights BD", "029")];
        store.write(CacheKey::Contacts, &contacts).expect("write");

        let loaded: Vec<ContactRecord> = store
            .read(CacheKey::Contacts)
            .expect("read")
            .expect("present");
        assert_eq!(loaded, contacts);
    }

    #[test]
    fn absent_snapshot_reads_as_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = CacheStore::open(dir.path()).expect("open");
        let loaded: Option<Vec<ContactRecord>> = store.read(CacheKey::Clients).expect("read");
        assert_eq!(loaded, None);
    }

    #[test]
    fn corrupt_snapshot_is_reported_and_defaulted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = CacheStore::open(dir.path()).expect("open");
        std::fs::write(dir.path().join("clients.json"), b"{not json").expect("seed");

        let err = store
            .read::<Vec<ContactRecord>>(CacheKey::Clients)
            .expect_err("must surface corruption");
        assert!(matches!(err, CacheError::Corrupt { key: "clients", .. }));

        let fallback: Vec<ContactRecord> = store.read_or_default(CacheKey::Clients);
        assert!(fallback.is_empty());
    }

    #[test]
    fn remove_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = CacheStore::open(dir.path()).expect("open");
        store.remove(CacheKey::SessionFlag).expect("first remove");
        store.remove(CacheKey::SessionFlag).expect("second remove");
    }
}
