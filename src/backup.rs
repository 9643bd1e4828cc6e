//! Maintenance exports and imports.
//!
//! Two export formats: a JSON data file for app-to-app migration, and a SQL
//! dump matching the relational backend's `clients` table for direct
//! database import. Restoring reads a previously exported JSON backup and
//! replaces the current booking collection.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ClientRecord;

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("backup is not valid JSON: {0}")]
    Parse(String),
    #[error("backup must be a JSON array of client records")]
    NotAnArray,
}

/// Serialize the booking collection as a standalone JSON backup.
pub fn export_json(records: &[ClientRecord]) -> String {
    serde_json::to_string_pretty(records).unwrap_or_else(|_| "[]".to_string())
}

/// Parse a JSON backup. The coordinator validates and applies the records;
/// this only guards the file shape.
pub fn import_json(raw: &str) -> Result<Vec<ClientRecord>, BackupError> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|err| BackupError::Parse(err.to_string()))?;
    if !value.is_array() {
        return Err(BackupError::NotAnArray);
    }
    serde_json::from_value(value).map_err(|err| BackupError::Parse(err.to_string()))
}

fn sql_escape(value: &str) -> String {
    value.replace('\'', "''")
}

fn sql_text(value: Option<&str>) -> String {
    match value {
        Some(text) => format!("'{}'", sql_escape(text)),
        None => "NULL".to_string(),
    }
}

/// Render the booking collection as a SQL dump for the relational backend.
///
/// Derived totals are included as columns the way the backend stores them;
/// re-importing through the app re-derives them from the ledger lists.
pub fn export_sql(records: &[ClientRecord], generated_at: DateTime<Utc>) -> String {
    let mut out = String::new();
    out.push_str("-- Studio booking database backup\n");
    out.push_str(&format!(
        "-- Generated on: {}\n\n",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    ));
    out.push_str("CREATE TABLE IF NOT EXISTS `clients` (\n");
    out.push_str("  `id` varchar(50) NOT NULL,\n");
    out.push_str("  `name` varchar(255) NOT NULL,\n");
    out.push_str("  `phone` varchar(50) NOT NULL,\n");
    out.push_str("  `email` varchar(255) DEFAULT NULL,\n");
    out.push_str("  `eventDate` date DEFAULT NULL,\n");
    out.push_str("  `eventType` varchar(100) DEFAULT NULL,\n");
    out.push_str("  `package` varchar(100) DEFAULT NULL,\n");
    out.push_str("  `totalPrice` decimal(10,2) DEFAULT 0.00,\n");
    out.push_str("  `paidAmount` decimal(10,2) DEFAULT 0.00,\n");
    out.push_str("  `status` varchar(50) DEFAULT NULL,\n");
    out.push_str("  `notes` text,\n");
    out.push_str("  `createdAt` datetime DEFAULT NULL,\n");
    out.push_str("  PRIMARY KEY (`id`)\n");
    out.push_str(") ENGINE=InnoDB DEFAULT CHARSET=utf8mb4;\n\n");

    if records.is_empty() {
        return out;
    }

    out.push_str("INSERT INTO `clients` VALUES\n");
    let rows: Vec<String> = records
        .iter()
        .map(|record| {
            format!(
                "({}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {})",
                sql_text(Some(&record.id)),
                sql_text(Some(&record.name)),
                sql_text(Some(&record.phone)),
                sql_text(record.email.as_deref()),
                sql_text(Some(&record.event_date.format("%Y-%m-%d").to_string())),
                sql_text(Some(&record.event_type)),
                sql_text(record.package.as_deref()),
                record.total_price,
                record.paid_amount,
                sql_text(Some(record.status.as_str())),
                sql_text(Some(&record.notes)),
                sql_text(Some(
                    &record.created_at.format("%Y-%m-%d %H:%M:%S").to_string()
                )),
            )
        })
        .collect();
    out.push_str(&rows.join(",\n"));
    out.push_str(";\n");
    out
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::{BackupError, export_json, export_sql, import_json};
    use crate::ledger::LineItem;
    use crate::model::ClientRecord;

    fn booking() -> ClientRecord {
        let mut record = ClientRecord::new(
            "D'Souza Family",
            "0171",
            "Anniversary",
            NaiveDate::from_ymd_opt(2026, 9, 9).unwrap(),
        );
        record.items.push(LineItem {
            id: "i1".into(),
            description: "Half day".into(),
            amount: dec!(450),
        });
        record.recompute_totals();
        record
    }

    #[test]
    fn json_backup_round_trips() {
        let records = vec![booking()];
        let raw = export_json(&records);
        let restored = import_json(&raw).expect("import");
        assert_eq!(restored, records);
    }

    #[test]
    fn import_rejects_non_array_backups() {
        let err = import_json(r#"{"clients": []}"#).expect_err("object is not a backup");
        assert!(matches!(err, BackupError::NotAnArray));
    }

    #[test]
    fn import_rejects_unparseable_files() {
        let err = import_json("not json at all").expect_err("must reject");
        assert!(matches!(err, BackupError::Parse(_)));
    }

    #[test]
    fn sql_dump_escapes_single_quotes() {
        let dump = export_sql(&[booking()], chrono::Utc::now());
        assert!(dump.contains("'D''Souza Family'"), "dump: {dump}");
        assert!(dump.contains("CREATE TABLE IF NOT EXISTS `clients`"));
        assert!(dump.contains("PRIMARY KEY (`id`)"));
    }

    #[test]
    fn sql_dump_without_records_has_no_insert() {
        let dump = export_sql(&[], chrono::Utc::now());
        assert!(!dump.contains("INSERT INTO"));
    }
}
