//! Sync coordinator: the only component that decides whether an operation
//! targets the network or the cache.
//!
//! Per session the coordinator bootstraps from the active backend, falling
//! back to the cached snapshot when the remote is unreachable. Mutations are
//! two-phase: phase one commits to the in-memory set and the cache store
//! synchronously and cannot fail; phase two echoes the mutation to the
//! backend and, on failure, only flips the connection state to offline.
//! Offline mode skips remote calls entirely; recovery happens through an
//! explicit operator resync, never by background polling.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::aggregate::{self, ClientFilter, DashboardStats};
use crate::backend::{self, Backend, ClientStore, ContactStore, ProfileStore};
use crate::cache::{CacheKey, CacheStore};
use crate::config::StudioConfig;
use crate::error::{ConfigError, RemoteReadError, ValidationError};
use crate::model::{ClientRecord, ContactRecord, SCHEMA_VERSION, StorageMode, StudioProfile};
use crate::session::Session;

/// Connection state toward the active backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnState {
    Online,
    Offline,
}

impl fmt::Display for ConnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Online => write!(f, "online"),
            Self::Offline => write!(f, "offline"),
        }
    }
}

/// Session-scoped owner of the authoritative in-memory record collections.
///
/// The cache store is a durable mirror written through on every change; no
/// other component writes to it while a coordinator is alive.
pub struct SyncCoordinator {
    session: Session,
    config: StudioConfig,
    cache: Arc<CacheStore>,
    backend: Arc<dyn Backend>,
    mode: StorageMode,
    conn: ConnState,
    clients: Vec<ClientRecord>,
    contacts: Vec<ContactRecord>,
    profile: StudioProfile,
}

impl SyncCoordinator {
    /// Build the coordinator for an authenticated session and bootstrap it.
    ///
    /// The storage mode persisted in the cache wins over the configured
    /// default, so an operator's explicit choice survives restarts.
    pub async fn start(
        session: Session,
        config: StudioConfig,
        cache: Arc<CacheStore>,
    ) -> Result<Self, ConfigError> {
        let mode = match cache.read::<StorageMode>(CacheKey::StorageMode) {
            Ok(Some(mode)) => mode,
            _ => config.default_mode,
        };
        let backend = backend::connect(mode, &config, cache.clone())?;
        Ok(Self::with_backend(session, config, cache, mode, backend).await)
    }

    /// Build the coordinator against an already-constructed backend and
    /// bootstrap it. `start` is the usual entry point; this one exists for
    /// embedders (and tests) that supply their own adapter.
    pub async fn with_backend(
        session: Session,
        config: StudioConfig,
        cache: Arc<CacheStore>,
        mode: StorageMode,
        backend: Arc<dyn Backend>,
    ) -> Self {
        let mut coordinator = Self {
            session,
            config,
            cache,
            backend,
            mode,
            conn: ConnState::Offline,
            clients: Vec::new(),
            contacts: Vec::new(),
            profile: StudioProfile::default(),
        };
        coordinator.bootstrap().await;
        coordinator
    }

    /// Attempt a fresh hydrate from the active backend; on failure fall
    /// back to the cached snapshot silently. An absent cache is a valid
    /// initial state, not an error.
    pub async fn bootstrap(&mut self) {
        match self.hydrate_remote().await {
            Ok(()) => {
                self.conn = ConnState::Online;
                info!(
                    backend = self.backend.label(),
                    clients = self.clients.len(),
                    "bootstrapped from backend"
                );
            }
            Err(err) => {
                self.conn = ConnState::Offline;
                warn!(
                    backend = self.backend.label(),
                    error = %err,
                    "bootstrap failed, serving cached records"
                );
                self.hydrate_cache();
            }
        }
    }

    async fn hydrate_remote(&mut self) -> Result<(), RemoteReadError> {
        let mut clients = self.backend.list_clients().await?;
        let contacts = self.backend.list_contacts().await?;
        let profile = self.backend.fetch_profile().await?;

        for record in &mut clients {
            record.migrate();
        }

        self.clients = clients;
        self.contacts = contacts;
        self.profile = match profile {
            Some(profile) => {
                self.persist_profile(&profile);
                profile
            }
            None => self
                .cache
                .read(CacheKey::StudioProfile)
                .unwrap_or_default()
                .unwrap_or_default(),
        };
        self.persist_clients();
        self.persist_contacts();
        Ok(())
    }

    fn hydrate_cache(&mut self) {
        let mut clients: Vec<ClientRecord> = self.cache.read_or_default(CacheKey::Clients);
        for record in &mut clients {
            record.migrate();
        }
        backend::sort_clients_newest_first(&mut clients);
        self.clients = clients;

        let mut contacts: Vec<ContactRecord> = self.cache.read_or_default(CacheKey::Contacts);
        backend::sort_contacts_by_name(&mut contacts);
        self.contacts = contacts;

        self.profile = self
            .cache
            .read(CacheKey::StudioProfile)
            .unwrap_or_default()
            .unwrap_or_default();
    }

    // ---- read surface ----

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn clients(&self) -> &[ClientRecord] {
        &self.clients
    }

    pub fn contacts(&self) -> &[ContactRecord] {
        &self.contacts
    }

    pub fn profile(&self) -> &StudioProfile {
        &self.profile
    }

    pub fn filtered_clients(&self, filter: &ClientFilter) -> Vec<&ClientRecord> {
        aggregate::filter_clients(&self.clients, filter)
    }

    pub fn stats(&self) -> DashboardStats {
        aggregate::compute_stats(&self.clients, Some(Utc::now().date_naive()))
    }

    pub fn storage_mode(&self) -> StorageMode {
        self.mode
    }

    pub fn conn_state(&self) -> ConnState {
        self.conn
    }

    pub fn is_offline(&self) -> bool {
        self.conn == ConnState::Offline
    }

    /// Persistent mode indicator text for the UI chrome.
    pub fn indicator(&self) -> String {
        format!("{} ({})", self.conn, self.backend.label())
    }

    // ---- mutations ----

    /// Save (create or replace) a booking.
    ///
    /// Validation failures reject the edit before any mutation happens.
    /// The local commit always succeeds; a failed remote echo flips the
    /// coordinator offline and keeps the local write as the new truth.
    pub async fn save_client(&mut self, mut record: ClientRecord) -> Result<(), ValidationError> {
        record.validate()?;
        record.schema_version = SCHEMA_VERSION;
        record.recompute_totals();

        match self.clients.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record.clone(),
            None => self.clients.push(record.clone()),
        }
        backend::sort_clients_newest_first(&mut self.clients);
        self.persist_clients();

        if self.conn == ConnState::Online {
            let echo = self.backend.upsert_client(&record).await;
            if let Err(err) = echo {
                self.go_offline("upsert client", &err);
            }
        }
        Ok(())
    }

    /// Delete a booking. Unknown ids are a no-op; deletion is irreversible.
    pub async fn delete_client(&mut self, id: &str) {
        let before = self.clients.len();
        self.clients.retain(|r| r.id != id);
        if self.clients.len() != before {
            self.persist_clients();
        }

        if self.conn == ConnState::Online {
            let echo = self.backend.remove_client(id).await;
            if let Err(err) = echo {
                self.go_offline("remove client", &err);
            }
        }
    }

    pub async fn save_contact(&mut self, record: ContactRecord) -> Result<(), ValidationError> {
        record.validate()?;

        match self.contacts.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record.clone(),
            None => self.contacts.push(record.clone()),
        }
        backend::sort_contacts_by_name(&mut self.contacts);
        self.persist_contacts();

        if self.conn == ConnState::Online {
            let echo = self.backend.upsert_contact(&record).await;
            if let Err(err) = echo {
                self.go_offline("upsert contact", &err);
            }
        }
        Ok(())
    }

    pub async fn delete_contact(&mut self, id: &str) {
        let before = self.contacts.len();
        self.contacts.retain(|r| r.id != id);
        if self.contacts.len() != before {
            self.persist_contacts();
        }

        if self.conn == ConnState::Online {
            let echo = self.backend.remove_contact(id).await;
            if let Err(err) = echo {
                self.go_offline("remove contact", &err);
            }
        }
    }

    /// Overwrite the studio profile singleton.
    pub async fn save_profile(&mut self, profile: StudioProfile) {
        self.profile = profile.clone();
        self.persist_profile(&profile);

        if self.conn == ConnState::Online {
            let echo = self.backend.save_profile(&profile).await;
            if let Err(err) = echo {
                self.go_offline("save profile", &err);
            }
        }
    }

    /// Replace the whole booking collection from an imported backup.
    ///
    /// Every record is validated up front; a single bad record rejects the
    /// import without touching the current collection.
    pub async fn import_clients(
        &mut self,
        mut records: Vec<ClientRecord>,
    ) -> Result<usize, ValidationError> {
        for record in &records {
            record.validate()?;
        }
        for record in &mut records {
            record.migrate();
        }
        backend::sort_clients_newest_first(&mut records);
        let count = records.len();
        self.clients = records;
        self.persist_clients();

        if self.conn == ConnState::Online {
            for record in self.clients.clone() {
                let echo = self.backend.upsert_client(&record).await;
                if let Err(err) = echo {
                    self.go_offline("import echo", &err);
                    break;
                }
            }
        }
        Ok(count)
    }

    // ---- mode and recovery ----

    /// Switch the active storage backend and re-bootstrap against it. The
    /// in-memory view is discarded; the persisted cache is not.
    pub async fn set_storage_mode(&mut self, mode: StorageMode) -> Result<(), ConfigError> {
        let backend = backend::connect(mode, &self.config, self.cache.clone())?;
        if let Err(err) = self.cache.write(CacheKey::StorageMode, &mode) {
            warn!(error = %err, "failed to persist storage mode");
        }
        info!(from = self.mode.as_str(), to = mode.as_str(), "switching storage mode");
        self.mode = mode;
        self.backend = backend;
        self.bootstrap().await;
        Ok(())
    }

    /// Operator-triggered resync; the only path from offline back online.
    pub async fn resync(&mut self) {
        debug!(backend = self.backend.label(), "operator resync requested");
        self.bootstrap().await;
    }

    /// End the session, clearing the persisted flag. Cached records stay.
    pub fn sign_out(self) {
        if let Err(err) = self.session.sign_out(&self.cache) {
            warn!(error = %err, "failed to clear session flag");
        }
    }

    // ---- internals ----

    fn go_offline(&mut self, op: &str, err: &dyn fmt::Display) {
        warn!(
            backend = self.backend.label(),
            op,
            error = %err,
            "remote echo failed, switching to offline mode"
        );
        self.conn = ConnState::Offline;
    }

    fn persist_clients(&self) {
        if let Err(err) = self.cache.write(CacheKey::Clients, &self.clients) {
            warn!(error = %err, "failed to persist clients snapshot");
        }
    }

    fn persist_contacts(&self) {
        if let Err(err) = self.cache.write(CacheKey::Contacts, &self.contacts) {
            warn!(error = %err, "failed to persist contacts snapshot");
        }
    }

    fn persist_profile(&self, profile: &StudioProfile) {
        if let Err(err) = self.cache.write(CacheKey::StudioProfile, profile) {
            warn!(error = %err, "failed to persist studio profile");
        }
    }
}
