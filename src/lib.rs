//! Local-first back office for photography studios.
//!
//! The library is the record persistence and financial-derivation layer:
//! a durable local cache of client/contact/settings records, synchronized
//! against one of three interchangeable storage backends, with financial
//! truth derived from an append-only ledger of itemized charges and
//! payments rather than stored as editable fields.
//!
//! The [`sync::SyncCoordinator`] is the entry point: it owns the in-memory
//! collections, decides whether operations target the network or the
//! cache, and degrades to offline/local operation when a remote call
//! fails. UI layers (the bundled CLI, or an embedding app) consume it and
//! never talk to a backend directly.

pub mod aggregate;
pub mod backend;
pub mod backup;
pub mod cache;
pub mod config;
pub mod error;
pub mod ledger;
pub mod model;
pub mod session;
pub mod sync;

pub use aggregate::{ClientFilter, DashboardStats};
pub use backend::{Backend, ClientStore, ContactStore, ProfileStore};
pub use cache::{CacheKey, CacheStore};
pub use config::StudioConfig;
pub use error::{
    CacheError, ConfigError, RemoteError, RemoteReadError, RemoteWriteError, ValidationError,
};
pub use ledger::{LineItem, PaymentEntry, Totals, derive_totals};
pub use model::{ClientRecord, ContactRecord, ShootStatus, StorageMode, StudioProfile};
pub use session::Session;
pub use sync::{ConnState, SyncCoordinator};
