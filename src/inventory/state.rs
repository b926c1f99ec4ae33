//! Inventory state snapshot and its pure transitions.

use std::sync::Arc;

use serde::Serialize;

use super::view::derive_view;
use crate::models::{Department, DepartmentFilter, SealRecord};

/// What the user has typed into the intake form but not yet submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeDraft {
    pub seal_id: String,
    pub department: Department,
}

/// Everything the intake page shows. Transitions return a new value.
#[derive(Debug, Clone, Default)]
pub struct InventoryState {
    pub draft: IntakeDraft,
    /// Last list fetched from the store, newest first
    pub records: Arc<Vec<SealRecord>>,
    pub search_term: String,
    pub department_filter: DepartmentFilter,
    pub loading: bool,
}

impl InventoryState {
    pub fn with_records(self, records: Vec<SealRecord>) -> Self {
        Self {
            records: Arc::new(records),
            ..self
        }
    }

    pub fn with_draft(self, draft: IntakeDraft) -> Self {
        Self { draft, ..self }
    }

    pub fn with_cleared_serial(self) -> Self {
        let draft = IntakeDraft {
            seal_id: String::new(),
            ..self.draft
        };
        Self { draft, ..self }
    }

    pub fn with_search_term(self, search_term: String) -> Self {
        Self {
            search_term,
            ..self
        }
    }

    pub fn with_department_filter(self, department_filter: DepartmentFilter) -> Self {
        Self {
            department_filter,
            ..self
        }
    }

    pub fn with_loading(self, loading: bool) -> Self {
        Self { loading, ..self }
    }

    /// Records passing the current search term and department filter.
    pub fn visible(&self) -> Vec<SealRecord> {
        derive_view(&self.records, &self.search_term, self.department_filter)
    }

    pub fn summary(&self) -> StateSummary {
        StateSummary {
            draft: self.draft.clone(),
            search_term: self.search_term.clone(),
            department_filter: self.department_filter,
            loading: self.loading,
            total: self.records.len(),
            visible: self.visible().len(),
        }
    }
}

/// Serializable view of the state, without the record list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSummary {
    pub draft: IntakeDraft,
    pub search_term: String,
    pub department_filter: DepartmentFilter,
    pub loading: bool,
    pub total: usize,
    pub visible: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SealStatus;

    fn record(seal_id: &str, department: Department) -> SealRecord {
        SealRecord {
            id: seal_id.to_lowercase(),
            seal_id: seal_id.to_string(),
            department: department.into(),
            status: SealStatus::InStock.into(),
            created_at: "2024-03-01T10:00:00Z".parse().unwrap(),
        }
    }

    #[test]
    fn test_transitions_leave_other_fields_alone() {
        let state = InventoryState::default()
            .with_draft(IntakeDraft {
                seal_id: "AB12".to_string(),
                department: Department::BellaCanva,
            })
            .with_search_term("ab".to_string())
            .with_loading(true);

        let next = state.clone().with_cleared_serial();
        assert_eq!(next.draft.seal_id, "");
        assert_eq!(next.draft.department, Department::BellaCanva);
        assert_eq!(next.search_term, "ab");
        assert!(next.loading);
        // The original value is untouched
        assert_eq!(state.draft.seal_id, "AB12");
    }

    #[test]
    fn test_summary_counts_visible_records() {
        let state = InventoryState::default()
            .with_records(vec![
                record("AB12", Department::Inbound),
                record("ZZ99", Department::Shipping),
            ])
            .with_department_filter(DepartmentFilter::Only(Department::Shipping));

        let summary = state.summary();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.visible, 1);
        assert_eq!(
            serde_json::to_value(&summary).unwrap()["departmentFilter"],
            "Shipping Department"
        );
    }
}
