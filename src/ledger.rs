//! Financial derivation over the booking ledger.
//!
//! A booking's ledger is the pair of ordered lists (itemized charges,
//! payment entries). Totals are always derived from those lists; a stored
//! total is trusted only as the operator-entered fallback for bookings
//! that carry no itemization at all.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One itemized charge on a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: String,
    pub description: String,
    pub amount: Decimal,
}

/// One payment entry against a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentEntry {
    pub id: String,
    pub date: NaiveDate,
    pub amount: Decimal,
    /// Open string; the UI enumerates methods, the schema does not.
    pub method: String,
}

/// Derived financial aggregates for one booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub total_price: Decimal,
    pub paid_amount: Decimal,
    /// May be negative on overpayment; never clamped.
    pub due_amount: Decimal,
}

/// Derive totals from the ledger lists.
///
/// `manual_total` is consulted only when `items` is empty. The result is
/// deterministic for a given input and safe to recompute on every mutation.
pub fn derive_totals(
    items: &[LineItem],
    payments: &[PaymentEntry],
    manual_total: Option<Decimal>,
) -> Totals {
    let total_price = if items.is_empty() {
        manual_total.unwrap_or(Decimal::ZERO)
    } else {
        items
            .iter()
            .fold(Decimal::ZERO, |acc, item| acc + item.amount)
            .round_dp(2)
    };

    let paid_amount = payments
        .iter()
        .fold(Decimal::ZERO, |acc, entry| acc + entry.amount)
        .round_dp(2);

    Totals {
        total_price,
        paid_amount,
        due_amount: total_price - paid_amount,
    }
}
