//! Local backend over the cache store.
//!
//! Used when the storage mode is `local` and whenever the sync coordinator
//! has entered offline mode. Never fails for connectivity reasons; the only
//! possible failures are filesystem errors, surfaced as provider errors.

use std::sync::Arc;

use async_trait::async_trait;

use crate::backend::{
    Backend, ClientStore, ContactStore, ProfileStore, sort_clients_newest_first,
    sort_contacts_by_name,
};
use crate::cache::{CacheKey, CacheStore};
use crate::error::{CacheError, RemoteError, RemoteReadError, RemoteWriteError};
use crate::model::{ClientRecord, ContactRecord, StudioProfile};

pub struct LocalBackend {
    cache: Arc<CacheStore>,
}

impl LocalBackend {
    pub fn new(cache: Arc<CacheStore>) -> Self {
        Self { cache }
    }
}

fn provider_err(err: CacheError) -> RemoteError {
    RemoteError::Provider(err.to_string())
}

#[async_trait]
impl ClientStore for LocalBackend {
    async fn list_clients(&self) -> Result<Vec<ClientRecord>, RemoteReadError> {
        let mut records: Vec<ClientRecord> = self.cache.read_or_default(CacheKey::Clients);
        sort_clients_newest_first(&mut records);
        Ok(records)
    }

    async fn upsert_client(&self, record: &ClientRecord) -> Result<(), RemoteWriteError> {
        let mut records: Vec<ClientRecord> = self.cache.read_or_default(CacheKey::Clients);
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record.clone(),
            None => records.push(record.clone()),
        }
        self.cache
            .write(CacheKey::Clients, &records)
            .map_err(|err| RemoteWriteError::from(provider_err(err)))
    }

    async fn remove_client(&self, id: &str) -> Result<(), RemoteWriteError> {
        let mut records: Vec<ClientRecord> = self.cache.read_or_default(CacheKey::Clients);
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            // Unknown id: deletes stay idempotent.
            return Ok(());
        }
        self.cache
            .write(CacheKey::Clients, &records)
            .map_err(|err| RemoteWriteError::from(provider_err(err)))
    }
}

#[async_trait]
impl ContactStore for LocalBackend {
    async fn list_contacts(&self) -> Result<Vec<ContactRecord>, RemoteReadError> {
        let mut records: Vec<ContactRecord> = self.cache.read_or_default(CacheKey::Contacts);
        sort_contacts_by_name(&mut records);
        Ok(records)
    }

    async fn upsert_contact(&self, record: &ContactRecord) -> Result<(), RemoteWriteError> {
        let mut records: Vec<ContactRecord> = self.cache.read_or_default(CacheKey::Contacts);
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record.clone(),
            None => records.push(record.clone()),
        }
        self.cache
            .write(CacheKey::Contacts, &records)
            .map_err(|err| RemoteWriteError::from(provider_err(err)))
    }

    async fn remove_contact(&self, id: &str) -> Result<(), RemoteWriteError> {
        let mut records: Vec<ContactRecord> = self.cache.read_or_default(CacheKey::Contacts);
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Ok(());
        }
        self.cache
            .write(CacheKey::Contacts, &records)
            .map_err(|err| RemoteWriteError::from(provider_err(err)))
    }
}

#[async_trait]
impl ProfileStore for LocalBackend {
    async fn fetch_profile(&self) -> Result<Option<StudioProfile>, RemoteReadError> {
        Ok(self.cache.read(CacheKey::StudioProfile).unwrap_or_default())
    }

    async fn save_profile(&self, profile: &StudioProfile) -> Result<(), RemoteWriteError> {
        self.cache
            .write(CacheKey::StudioProfile, profile)
            .map_err(|err| RemoteWriteError::from(provider_err(err)))
    }
}

impl Backend for LocalBackend {
    fn label(&self) -> &'static str {
        "local"
    }
}
