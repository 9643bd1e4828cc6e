//! Dashboard statistics and multi-predicate filtering over the in-memory
//! record set. Pure functions: re-running over an unchanged collection
//! yields identical results.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::model::{ClientRecord, ShootStatus};

/// Filter predicates for the booking list. Absent fields are no-ops (the
/// UI's "All" choice); set fields are AND-combined.
#[derive(Debug, Clone, Default)]
pub struct ClientFilter {
    /// Case-insensitive substring match over name, phone, event type and
    /// location.
    pub text_query: Option<String>,
    pub status: Option<ShootStatus>,
    pub event_type: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl ClientFilter {
    pub fn matches(&self, record: &ClientRecord) -> bool {
        if let Some(query) = &self.text_query {
            let query = query.to_lowercase();
            if !query.is_empty() {
                let hit = record.name.to_lowercase().contains(&query)
                    || record.phone.to_lowercase().contains(&query)
                    || record.event_type.to_lowercase().contains(&query)
                    || record
                        .location
                        .as_deref()
                        .is_some_and(|loc| loc.to_lowercase().contains(&query));
                if !hit {
                    return false;
                }
            }
        }
        if let Some(status) = self.status
            && record.status != status
        {
            return false;
        }
        if let Some(event_type) = &self.event_type
            && record.event_type != *event_type
        {
            return false;
        }
        if let Some(from) = self.date_from
            && record.event_date < from
        {
            return false;
        }
        if let Some(to) = self.date_to
            && record.event_date > to
        {
            return false;
        }
        true
    }
}

/// Apply the filter, preserving the input ordering (creation-descending as
/// the coordinator keeps it; consuming views may re-sort).
pub fn filter_clients<'a>(
    records: &'a [ClientRecord],
    filter: &ClientFilter,
) -> Vec<&'a ClientRecord> {
    records.iter().filter(|r| filter.matches(r)).collect()
}

/// Aggregates for the dashboard cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_clients: usize,
    pub total_revenue: Decimal,
    /// Signed sum of due amounts; overpayments pull it down.
    pub pending_payments: Decimal,
    pub upcoming_shoots: usize,
}

/// Compute dashboard statistics over the full record set.
///
/// When `today` is given, upcoming shoots are additionally constrained to
/// event dates on or after it; otherwise every pending booking counts.
pub fn compute_stats(records: &[ClientRecord], today: Option<NaiveDate>) -> DashboardStats {
    let total_revenue = records
        .iter()
        .fold(Decimal::ZERO, |acc, r| acc + r.total_price)
        .round_dp(2);
    let pending_payments = records
        .iter()
        .fold(Decimal::ZERO, |acc, r| acc + r.due_amount)
        .round_dp(2);
    let upcoming_shoots = records
        .iter()
        .filter(|r| r.status == ShootStatus::Pending)
        .filter(|r| today.is_none_or(|today| r.event_date >= today))
        .count();

    DashboardStats {
        total_clients: records.len(),
        total_revenue,
        pending_payments,
        upcoming_shoots,
    }
}
