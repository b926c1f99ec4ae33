//! Seal store contract and its implementations.
//!
//! The store is the source of truth. The inventory only ever holds a snapshot
//! returned by [`SealStore::list_newest_first`].

mod memory;
mod rest;
mod sqlite;

pub use memory::MemorySealStore;
pub use rest::RestSealStore;
pub use sqlite::{init_database, SqliteSealStore};

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};

use crate::config::StoreBackend;
use crate::errors::AppError;
use crate::models::{NewSeal, SealRecord, SealStatus, StoredValue};

/// The four calls the inventory needs from a relational store.
#[async_trait]
pub trait SealStore: Send + Sync {
    /// All records, newest `created_at` first.
    async fn list_newest_first(&self) -> Result<Vec<SealRecord>, AppError>;

    /// Insert one record. The store assigns `id` and `created_at`.
    async fn insert(&self, seal: &NewSeal) -> Result<(), AppError>;

    /// Overwrite the status of one record. `NotFound` when no row matched.
    async fn update_status(&self, id: &str, status: SealStatus) -> Result<(), AppError>;

    /// Delete one record. `NotFound` when no row matched.
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

/// Open the store selected by configuration.
pub async fn open(backend: &StoreBackend) -> Result<Arc<dyn SealStore>, AppError> {
    let store: Arc<dyn SealStore> = match backend {
        StoreBackend::Sqlite { db_path } => {
            let pool = init_database(db_path).await?;
            Arc::new(SqliteSealStore::new(pool))
        }
        StoreBackend::Rest {
            base_url,
            api_key,
            table,
        } => Arc::new(RestSealStore::new(base_url, api_key, table)?),
        StoreBackend::Memory => Arc::new(MemorySealStore::new()),
    };
    Ok(store)
}

/// A row as stored, before its columns are decoded.
pub(crate) struct RawSealRow {
    pub id: String,
    pub seal_id: String,
    pub department: String,
    pub status: String,
    pub created_at: String,
}

impl TryFrom<RawSealRow> for SealRecord {
    type Error = AppError;

    fn try_from(row: RawSealRow) -> Result<Self, Self::Error> {
        let created_at = parse_timestamp(&row.created_at)
            .map_err(|e| AppError::Store(format!("Row {}: {}", row.id, e.message())))?;
        Ok(SealRecord {
            department: StoredValue::from_raw(row.department),
            status: StoredValue::from_raw(row.status),
            created_at,
            id: row.id,
            seal_id: row.seal_id,
        })
    }
}

/// Decode rows, dropping (and logging) any with an unreadable timestamp.
///
/// Department and status text outside the known values is kept as is.
pub(crate) fn decode_rows(rows: Vec<RawSealRow>) -> Vec<SealRecord> {
    rows.into_iter()
        .filter_map(|row| match SealRecord::try_from(row) {
            Ok(record) => {
                if record.department.known().is_none() || record.status.known().is_none() {
                    tracing::debug!(
                        "Seal row {} holds department '{}' and status '{}' outside the known values",
                        record.id,
                        record.department,
                        record.status
                    );
                }
                Some(record)
            }
            Err(e) => {
                tracing::warn!("Skipping undecodable seal row: {}", e);
                None
            }
        })
        .collect()
}

/// Parse an RFC 3339 timestamp, or a zone-less one taken as UTC.
pub(crate) fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, AppError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| AppError::Store(format!("Invalid created_at timestamp '{}'", s)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::derive_view;
    use crate::models::{Department, DepartmentFilter};

    fn raw(department: &str, status: &str) -> RawSealRow {
        RawSealRow {
            id: "7".to_string(),
            seal_id: "AB12".to_string(),
            department: department.to_string(),
            status: status.to_string(),
            created_at: "2024-03-01T10:00:00.123456+00:00".to_string(),
        }
    }

    #[test]
    fn test_parse_timestamp_variants() {
        let a = parse_timestamp("2024-03-01T10:00:00Z").unwrap();
        let b = parse_timestamp("2024-03-01T12:00:00+02:00").unwrap();
        let c = parse_timestamp("2024-03-01T10:00:00.000").unwrap();
        let d = parse_timestamp("2024-03-01 10:00:00").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(a, d);
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_decode_rows_keeps_unknown_department_and_status() {
        let rows = vec![
            raw("Shipping Department", "Applied"),
            raw("Dept A", "In Stock"),
            raw("Bella Canva", "Lost"),
        ];
        let records = decode_rows(rows);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].department.known(), Some(Department::Shipping));
        assert_eq!(records[0].status.known(), Some(SealStatus::Applied));
        assert_eq!(
            records[1].department,
            StoredValue::Unrecognized("Dept A".to_string())
        );
        assert_eq!(records[2].status, StoredValue::Unrecognized("Lost".to_string()));

        let all = derive_view(&records, "", DepartmentFilter::All);
        assert_eq!(all, records);
        let shipping = derive_view(
            &records,
            "",
            DepartmentFilter::Only(Department::Shipping),
        );
        assert_eq!(shipping.len(), 1);
    }

    #[test]
    fn test_decode_rows_skips_bad_timestamps() {
        let mut broken = raw("Inbound Department", "In Stock");
        broken.created_at = "not a date".to_string();
        let records = decode_rows(vec![broken, raw("Inbound Department", "In Stock")]);
        assert_eq!(records.len(), 1);
    }
}
