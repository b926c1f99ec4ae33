//! In-process seal store.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::SealStore;
use crate::errors::AppError;
use crate::models::{NewSeal, SealRecord, SealStatus};

/// Seal store kept in memory. Contents are lost when the process exits.
#[derive(Default)]
pub struct MemorySealStore {
    // Insertion order
    rows: RwLock<Vec<SealRecord>>,
    unavailable: AtomicBool,
    listing_unavailable: AtomicBool,
}

impl MemorySealStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with a store error until switched back.
    #[cfg(test)]
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make only listing fail, so writes succeed but reloads do not.
    #[cfg(test)]
    pub fn set_listing_unavailable(&self, unavailable: bool) {
        self.listing_unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), AppError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::Store("Memory store is unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl SealStore for MemorySealStore {
    async fn list_newest_first(&self) -> Result<Vec<SealRecord>, AppError> {
        self.check_available()?;
        if self.listing_unavailable.load(Ordering::SeqCst) {
            return Err(AppError::Store("Memory store listing is unavailable".to_string()));
        }
        let mut records: Vec<SealRecord> = self.rows.read().await.iter().rev().cloned().collect();
        // Stable sort keeps later inserts first on equal timestamps
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn insert(&self, seal: &NewSeal) -> Result<(), AppError> {
        self.check_available()?;
        self.rows.write().await.push(SealRecord {
            id: uuid::Uuid::new_v4().to_string(),
            seal_id: seal.seal_id.clone(),
            department: seal.department.into(),
            status: seal.status.into(),
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn update_status(&self, id: &str, status: SealStatus) -> Result<(), AppError> {
        self.check_available()?;
        let mut rows = self.rows.write().await;
        let row = rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Seal {} not found", id)))?;
        row.status = status.into();
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.check_available()?;
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|r| r.id != id);
        if rows.len() == before {
            return Err(AppError::NotFound(format!("Seal {} not found", id)));
        }
        Ok(())
    }
}
