//! Form and view state endpoints.

use axum::extract::State;

use super::{success, ApiResult, JsonBody};
use crate::inventory::StateSummary;
use crate::models::{Department, UpdateDraftRequest, UpdateViewRequest};
use crate::AppState;

/// GET /api/departments - Departments in display order.
pub async fn list_departments() -> ApiResult<Vec<Department>> {
    success(Department::ALL.to_vec())
}

/// GET /api/view - Draft, filters and list counts.
pub async fn get_view(State(state): State<AppState>) -> ApiResult<StateSummary> {
    success(state.inventory.snapshot().await.summary())
}

/// PUT /api/view - Change the search term and/or department filter.
pub async fn update_view(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<UpdateViewRequest>,
) -> ApiResult<StateSummary> {
    state
        .inventory
        .set_view(request.search_term, request.department_filter)
        .await;
    success(state.inventory.snapshot().await.summary())
}

/// PUT /api/draft - Edit the intake draft.
pub async fn update_draft(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<UpdateDraftRequest>,
) -> ApiResult<StateSummary> {
    state
        .inventory
        .set_draft(request.seal_id, request.department)
        .await;
    success(state.inventory.snapshot().await.summary())
}

/// POST /api/draft/submit - Submit the draft as an intake.
pub async fn submit_draft(State(state): State<AppState>) -> ApiResult<StateSummary> {
    state.inventory.submit_draft().await?;
    success(state.inventory.snapshot().await.summary())
}
