//! Inventory view-model.
//!
//! Holds the last list fetched from the seal store plus the form and filter
//! state, and routes every mutation through the store. After a successful
//! write the whole list is fetched again and swapped in; nothing is patched
//! locally. Two overlapping mutations each trigger a reload, and whichever
//! reload finishes last decides the cached list.

mod csv;
mod state;
mod view;

pub use csv::{export_csv, CSV_FILE_NAME};
pub use state::{IntakeDraft, InventoryState, StateSummary};
pub use view::derive_view;

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::errors::AppError;
use crate::models::{Department, DepartmentFilter, NewSeal, SealStatus};
use crate::store::SealStore;

/// Prompt shown before a record is deleted.
pub const DELETE_PROMPT: &str = "Delete this record?";

/// A blocking yes/no decision taken before an irreversible action.
pub trait Confirm: Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// A decision already taken by the caller.
impl Confirm for bool {
    fn confirm(&self, _prompt: &str) -> bool {
        *self
    }
}

/// Result of [`InventoryViewModel::remove`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Deleted,
    Cancelled,
}

/// The single component with decision logic: what to show, what to write,
/// and when to refresh.
pub struct InventoryViewModel {
    store: Arc<dyn SealStore>,
    state: RwLock<InventoryState>,
    csv_date_format: String,
}

impl InventoryViewModel {
    pub fn new(store: Arc<dyn SealStore>, csv_date_format: impl Into<String>) -> Self {
        Self {
            store,
            state: RwLock::new(InventoryState::default()),
            csv_date_format: csv_date_format.into(),
        }
    }

    /// A copy of the current state.
    pub async fn snapshot(&self) -> InventoryState {
        self.state.read().await.clone()
    }

    /// Apply a pure transition. The lock is never held across a store call.
    async fn transition(&self, f: impl FnOnce(InventoryState) -> InventoryState) {
        let mut guard = self.state.write().await;
        let current = std::mem::take(&mut *guard);
        *guard = f(current);
    }

    /// Replace the cached list with the store's current rows.
    ///
    /// A failed fetch keeps the previous list. Returns whether the list was
    /// replaced.
    pub async fn reload(&self) -> bool {
        match self.store.list_newest_first().await {
            Ok(records) => {
                tracing::debug!("Reloaded {} seal records", records.len());
                self.transition(|s| s.with_records(records)).await;
                true
            }
            Err(e) => {
                tracing::warn!("Failed to reload seal records, keeping cached list: {}", e);
                false
            }
        }
    }

    /// Record a new in-stock seal.
    ///
    /// The draft keeps the submitted values if the insert fails. `loading` is
    /// cleared before this returns, whatever the outcome.
    pub async fn intake(&self, seal_id: &str, department: Department) -> Result<(), AppError> {
        let seal = NewSeal::in_stock(seal_id, department)?;

        let draft = IntakeDraft {
            seal_id: seal_id.to_string(),
            department,
        };
        self.transition(|s| s.with_draft(draft).with_loading(true))
            .await;

        let result = self.store.insert(&seal).await;

        match result {
            Ok(()) => {
                tracing::info!("Took in seal {} to {}", seal.seal_id, seal.department);
                self.transition(|s| s.with_loading(false).with_cleared_serial())
                    .await;
                self.reload().await;
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to take in seal {}: {}", seal.seal_id, e);
                self.transition(|s| s.with_loading(false)).await;
                Err(e)
            }
        }
    }

    /// Update the intake draft without submitting it.
    pub async fn set_draft(&self, seal_id: Option<String>, department: Option<Department>) {
        self.transition(|s| {
            let draft = IntakeDraft {
                seal_id: seal_id.unwrap_or_else(|| s.draft.seal_id.clone()),
                department: department.unwrap_or(s.draft.department),
            };
            s.with_draft(draft)
        })
        .await;
    }

    /// Submit the current draft as an intake.
    pub async fn submit_draft(&self) -> Result<(), AppError> {
        let draft = self.state.read().await.draft.clone();
        self.intake(&draft.seal_id, draft.department).await
    }

    /// Mark a seal as applied. Re-applying is a harmless overwrite.
    pub async fn mark_applied(&self, id: &str) -> Result<(), AppError> {
        self.store.update_status(id, SealStatus::Applied).await?;
        tracing::info!("Marked seal record {} as applied", id);
        self.reload().await;
        Ok(())
    }

    /// Delete a record once `confirmation` agrees. No store call is made on
    /// cancellation.
    pub async fn remove(
        &self,
        id: &str,
        confirmation: &dyn Confirm,
    ) -> Result<RemoveOutcome, AppError> {
        if !confirmation.confirm(DELETE_PROMPT) {
            tracing::debug!("Deletion of seal record {} cancelled", id);
            return Ok(RemoveOutcome::Cancelled);
        }

        self.store.delete(id).await?;
        tracing::info!("Deleted seal record {}", id);
        self.reload().await;
        Ok(RemoveOutcome::Deleted)
    }

    /// Change the list search term and/or department filter.
    pub async fn set_view(&self, search_term: Option<String>, filter: Option<DepartmentFilter>) {
        self.transition(|mut s| {
            if let Some(term) = search_term {
                s = s.with_search_term(term);
            }
            if let Some(filter) = filter {
                s = s.with_department_filter(filter);
            }
            s
        })
        .await;
    }

    /// CSV of the whole cached list, newest first.
    pub async fn export_csv(&self) -> Vec<u8> {
        let records = Arc::clone(&self.state.read().await.records);
        export_csv(&records, &self.csv_date_format)
    }
}
