//! List filtering.

use crate::models::{DepartmentFilter, SealRecord};

/// Records whose serial contains `search_term` (case-insensitive) and whose
/// department passes `filter`, in input order.
pub fn derive_view(
    records: &[SealRecord],
    search_term: &str,
    filter: DepartmentFilter,
) -> Vec<SealRecord> {
    let needle = search_term.to_lowercase();
    records
        .iter()
        .filter(|r| r.seal_id.to_lowercase().contains(&needle) && filter.matches(&r.department))
        .cloned()
        .collect()
}
