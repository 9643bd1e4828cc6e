//! Storage backend abstraction.
//!
//! Provides a backend-agnostic `Backend` trait that unifies the CRUD
//! surface over the three interchangeable transports:
//!
//! - `local`: operates purely against the on-disk cache store
//! - `rest`: JSON over HTTP against the relational backend
//! - `cloud`: a remote document store addressed by collection and id
//!
//! The active variant is selected by [`StorageMode`] via [`connect`];
//! call sites hold an `Arc<dyn Backend>` and never branch on the mode
//! themselves.

pub mod cloud;
pub mod local;
pub mod rest;

use std::sync::Arc;

use async_trait::async_trait;

use crate::cache::CacheStore;
use crate::config::StudioConfig;
use crate::error::{ConfigError, RemoteReadError, RemoteWriteError};
use crate::model::{ClientRecord, ContactRecord, StorageMode, StudioProfile};

/// Record collections a backend serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Clients,
    Contacts,
    Settings,
}

impl Collection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Clients => "clients",
            Self::Contacts => "contacts",
            Self::Settings => "settings",
        }
    }
}

/// Booking collection operations.
///
/// `list_clients` returns most-recently-created first. `remove_client` of
/// an unknown id is a success, keeping deletes idempotent.
#[async_trait]
pub trait ClientStore: Send + Sync {
    async fn list_clients(&self) -> Result<Vec<ClientRecord>, RemoteReadError>;
    async fn upsert_client(&self, record: &ClientRecord) -> Result<(), RemoteWriteError>;
    async fn remove_client(&self, id: &str) -> Result<(), RemoteWriteError>;
}

/// Address-book collection operations. `list_contacts` returns entries
/// sorted alphabetically by name.
#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn list_contacts(&self) -> Result<Vec<ContactRecord>, RemoteReadError>;
    async fn upsert_contact(&self, record: &ContactRecord) -> Result<(), RemoteWriteError>;
    async fn remove_contact(&self, id: &str) -> Result<(), RemoteWriteError>;
}

/// Singleton studio-profile operations.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn fetch_profile(&self) -> Result<Option<StudioProfile>, RemoteReadError>;
    async fn save_profile(&self, profile: &StudioProfile) -> Result<(), RemoteWriteError>;
}

/// Backend-agnostic storage supertrait.
pub trait Backend: ClientStore + ContactStore + ProfileStore + Send + Sync {
    /// Short label for logs and the mode indicator.
    fn label(&self) -> &'static str;
}

/// Build the backend variant selected by `mode`.
///
/// Stateless beyond connection info; remote variants are not probed here,
/// so this only fails when required configuration is missing.
pub fn connect(
    mode: StorageMode,
    config: &StudioConfig,
    cache: Arc<CacheStore>,
) -> Result<Arc<dyn Backend>, ConfigError> {
    match mode {
        StorageMode::Local => Ok(Arc::new(local::LocalBackend::new(cache))),
        StorageMode::Relational => {
            let url = config
                .rest_url
                .clone()
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: "STUDIO_REST_URL".to_string(),
                    message: "required when storage mode is 'relational'".to_string(),
                })?;
            Ok(Arc::new(rest::RestBackend::new(url)))
        }
        StorageMode::DocumentCloud => {
            let url = config
                .cloud_url
                .clone()
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: "STUDIO_CLOUD_URL".to_string(),
                    message: "required when storage mode is 'document_cloud'".to_string(),
                })?;
            Ok(Arc::new(cloud::CloudBackend::new(
                url,
                config.cloud_api_key.clone(),
            )))
        }
    }
}

/// Order bookings most-recently-created first.
pub(crate) fn sort_clients_newest_first(records: &mut [ClientRecord]) {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Order contacts alphabetically, case-insensitive.
pub(crate) fn sort_contacts_by_name(records: &mut [ContactRecord]) {
    records.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
}
