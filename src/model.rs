//! Record schema for the studio back office.
//!
//! Wire names are camelCase to stay compatible with snapshots produced by
//! earlier builds of the app. Every field a legacy snapshot may lack carries
//! a serde default so old cache files and backend rows hydrate cleanly
//! instead of erroring.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::ledger::{self, LineItem, PaymentEntry, Totals};

/// Current record schema version.
///
/// Version 1 stored `totalPrice`/`paidAmount` as directly editable fields;
/// version 2 derives them from the `items`/`payments` ledger lists.
pub const SCHEMA_VERSION: u32 = 2;

fn legacy_schema_version() -> u32 {
    1
}

/// Booking lifecycle status. Any value may be set at any time; the UI offers
/// the full set on every edit rather than enforcing a transition graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShootStatus {
    Pending,
    Editing,
    Completed,
    Cancelled,
}

impl ShootStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Editing => "Editing",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    pub fn from_str_value(value: &str) -> Option<Self> {
        match value {
            "Pending" => Some(Self::Pending),
            "Editing" => Some(Self::Editing),
            "Completed" => Some(Self::Completed),
            "Cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl Default for ShootStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// Which backend adapter variant is active. Persisted alongside the cache,
/// read at startup and on explicit operator change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageMode {
    Local,
    Relational,
    DocumentCloud,
}

impl StorageMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Relational => "relational",
            Self::DocumentCloud => "document_cloud",
        }
    }

    pub fn from_str_value(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "local" => Some(Self::Local),
            "relational" => Some(Self::Relational),
            "document_cloud" | "document-cloud" | "cloud" => Some(Self::DocumentCloud),
            _ => None,
        }
    }
}

impl Default for StorageMode {
    fn default() -> Self {
        Self::Local
    }
}

/// One booking / customer engagement.
///
/// `total_price`, `paid_amount` and `due_amount` are derived state kept on
/// the record for the benefit of list views and remote rows; they are
/// overwritten by [`ClientRecord::recompute_totals`] on every mutation and
/// on hydrate. The stored `total_price` is authoritative input only for
/// bookings without line items (operator-entered flat total).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRecord {
    pub id: String,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    pub event_type: String,
    pub event_date: NaiveDate,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub package: Option<String>,
    /// Inline-encoded binary produced by the image utility; opaque here.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub payments: Vec<PaymentEntry>,
    #[serde(default)]
    pub total_price: Decimal,
    #[serde(default)]
    pub paid_amount: Decimal,
    #[serde(default)]
    pub due_amount: Decimal,
    #[serde(default)]
    pub status: ShootStatus,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
    #[serde(default = "legacy_schema_version")]
    pub schema_version: u32,
}

impl ClientRecord {
    /// Create a fresh booking with a client-minted id.
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        event_type: impl Into<String>,
        event_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            phone: phone.into(),
            email: None,
            event_type: event_type.into(),
            event_date,
            location: None,
            package: None,
            image: None,
            items: Vec::new(),
            payments: Vec::new(),
            total_price: Decimal::ZERO,
            paid_amount: Decimal::ZERO,
            due_amount: Decimal::ZERO,
            status: ShootStatus::Pending,
            notes: String::new(),
            created_at: Utc::now(),
            schema_version: SCHEMA_VERSION,
        }
    }

    /// Derive totals from the ledger lists without mutating the record.
    pub fn totals(&self) -> Totals {
        ledger::derive_totals(&self.items, &self.payments, Some(self.total_price))
    }

    /// Overwrite the derived fields from the ledger lists.
    pub fn recompute_totals(&mut self) {
        let totals = self.totals();
        self.total_price = totals.total_price;
        self.paid_amount = totals.paid_amount;
        self.due_amount = totals.due_amount;
    }

    /// Upgrade a legacy snapshot in place, then re-derive totals.
    ///
    /// Version 1 records carried an editable `paidAmount` with no payments
    /// list; that balance becomes a single opening payment entry so the
    /// derivation invariant holds from here on.
    pub fn migrate(&mut self) {
        if self.schema_version < SCHEMA_VERSION {
            if self.payments.is_empty() && self.paid_amount != Decimal::ZERO {
                self.payments.push(PaymentEntry {
                    id: Uuid::new_v4().to_string(),
                    date: self.created_at.date_naive(),
                    amount: self.paid_amount,
                    method: "balance forward".to_string(),
                });
            }
            self.schema_version = SCHEMA_VERSION;
        }
        self.recompute_totals();
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::MissingId);
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "name" });
        }
        if self.phone.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "phone" });
        }
        if self.total_price < Decimal::ZERO && self.items.is_empty() {
            return Err(ValidationError::NegativeAmount {
                field: "totalPrice",
                amount: self.total_price,
            });
        }
        for item in &self.items {
            if item.amount < Decimal::ZERO {
                return Err(ValidationError::NegativeAmount {
                    field: "item amount",
                    amount: item.amount,
                });
            }
        }
        for payment in &self.payments {
            if payment.amount < Decimal::ZERO {
                return Err(ValidationError::NegativeAmount {
                    field: "payment amount",
                    amount: payment.amount,
                });
            }
        }
        Ok(())
    }
}

/// Address-book entry unrelated to bookings (vendor, collaborator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRecord {
    pub id: String,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl ContactRecord {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            phone: phone.into(),
            email: None,
            address: None,
            image: None,
            notes: String::new(),
            created_at: Utc::now(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::MissingId);
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "name" });
        }
        Ok(())
    }
}

/// Singleton studio configuration. Overwritten in place, never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudioProfile {
    #[serde(default = "StudioProfile::default_name")]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub website: String,
    #[serde(default = "StudioProfile::default_currency")]
    pub currency: String,
    #[serde(default)]
    pub tax_id: String,
    /// Inline-encoded logo image; opaque here.
    #[serde(default)]
    pub logo: Option<String>,
}

impl StudioProfile {
    fn default_name() -> String {
        "Modern Photo Studio".to_string()
    }

    fn default_currency() -> String {
        "$".to_string()
    }
}

impl Default for StudioProfile {
    fn default() -> Self {
        Self {
            name: Self::default_name(),
            address: String::new(),
            phone: String::new(),
            email: String::new(),
            website: String::new(),
            currency: Self::default_currency(),
            tax_id: String::new(),
            logo: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::ledger::LineItem;

    fn booking() -> ClientRecord {
        ClientRecord::new(
            "Anika Rahman",
            "+880 171 000 0000",
            "Wedding",
            NaiveDate::from_ymd_opt(2026, 11, 20).unwrap(),
        )
    }

    #[test]
    fn status_round_trips_through_str_values() {
        for status in [
            ShootStatus::Pending,
            ShootStatus::Editing,
            ShootStatus::Completed,
            ShootStatus::Cancelled,
        ] {
            assert_eq!(ShootStatus::from_str_value(status.as_str()), Some(status));
        }
        assert_eq!(ShootStatus::from_str_value("Archived"), None);
    }

    #[test]
    fn storage_mode_accepts_loose_spellings() {
        assert_eq!(
            StorageMode::from_str_value("Document-Cloud"),
            Some(StorageMode::DocumentCloud)
        );
        assert_eq!(StorageMode::from_str_value("LOCAL"), Some(StorageMode::Local));
        assert_eq!(StorageMode::from_str_value("mysql"), None);
    }

    #[test]
    fn legacy_snapshot_hydrates_with_defaults() {
        // A v1 row: no items/payments lists, no schema tag, editable totals.
        let raw = r#"{
            "id": "c-1",
            "name": "Rahim Uddin",
            "phone": "017",
            "eventType": "Portrait",
            "eventDate": "2025-01-05",
            "totalPrice": "1500",
            "paidAmount": "600",
            "status": "Completed",
            "createdAt": "2025-01-01T10:00:00Z"
        }"#;
        let mut record: ClientRecord = serde_json::from_str(raw).expect("legacy row");
        assert_eq!(record.schema_version, 1);
        assert!(record.items.is_empty());

        record.migrate();
        assert_eq!(record.schema_version, SCHEMA_VERSION);
        // The stored balance became an opening payment entry.
        assert_eq!(record.payments.len(), 1);
        assert_eq!(record.paid_amount, dec!(600));
        assert_eq!(record.total_price, dec!(1500));
        assert_eq!(record.due_amount, dec!(900));
    }

    #[test]
    fn unknown_fields_are_ignored_on_hydrate() {
        let raw = r#"{
            "id": "c-2",
            "name": "Nadia",
            "phone": "018",
            "eventType": "Birthday",
            "eventDate": "2026-02-02",
            "createdAt": "2026-01-01T00:00:00Z",
            "legacyDiscountFlag": true
        }"#;
        let record: ClientRecord = serde_json::from_str(raw).expect("row with stray field");
        assert_eq!(record.name, "Nadia");
    }

    #[test]
    fn recompute_overwrites_derived_fields() {
        let mut record = booking();
        record.total_price = dec!(999);
        record.items.push(LineItem {
            id: "i1".into(),
            description: "Full day coverage".into(),
            amount: dec!(800),
        });
        record.due_amount = dec!(12345); // stale, must not survive
        record.recompute_totals();
        assert_eq!(record.total_price, dec!(800));
        assert_eq!(record.due_amount, dec!(800));
    }

    #[test]
    fn validate_rejects_negative_item_amount() {
        let mut record = booking();
        record.items.push(LineItem {
            id: "i1".into(),
            description: "bad".into(),
            amount: dec!(-1),
        });
        let err = record.validate().expect_err("negative amount must be rejected");
        assert_eq!(
            err,
            ValidationError::NegativeAmount {
                field: "item amount",
                amount: dec!(-1)
            }
        );
    }

    #[test]
    fn validate_rejects_blank_identity() {
        let mut record = booking();
        record.id = "  ".into();
        assert_eq!(record.validate(), Err(ValidationError::MissingId));
    }
}
