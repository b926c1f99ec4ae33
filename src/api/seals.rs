//! Seal list endpoints.

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use super::{success, ApiResult, JsonBody};
use crate::errors::AppError;
use crate::inventory::{derive_view, RemoveOutcome, CSV_FILE_NAME};
use crate::models::{DepartmentFilter, IntakeRequest, SealRecord};
use crate::AppState;

/// List query parameters. Absent values fall back to the stored view settings.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
}

/// Filtered records plus the size of the unfiltered list.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SealList {
    pub records: Vec<SealRecord>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReloadResponse {
    pub refreshed: bool,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

async fn current_list(state: &AppState) -> SealList {
    let snapshot = state.inventory.snapshot().await;
    SealList {
        records: snapshot.visible(),
        total: snapshot.records.len(),
    }
}

/// GET /api/seals - Filtered view of the cached list.
pub async fn list_seals(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> ApiResult<SealList> {
    let snapshot = state.inventory.snapshot().await;

    let search = params.search.unwrap_or(snapshot.search_term);
    let filter = match params.department {
        Some(d) => d.parse::<DepartmentFilter>()?,
        None => snapshot.department_filter,
    };

    success(SealList {
        records: derive_view(&snapshot.records, &search, filter),
        total: snapshot.records.len(),
    })
}

/// POST /api/seals - Take a seal into inventory.
pub async fn intake_seal(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<IntakeRequest>,
) -> ApiResult<SealList> {
    let department = match request.department {
        Some(d) => d,
        None => state.inventory.snapshot().await.draft.department,
    };

    state.inventory.intake(&request.seal_id, department).await?;
    success(current_list(&state).await)
}

/// POST /api/seals/reload - Fetch the list from the store again.
pub async fn reload_seals(State(state): State<AppState>) -> ApiResult<ReloadResponse> {
    let refreshed = state.inventory.reload().await;
    let total = state.inventory.snapshot().await.records.len();
    success(ReloadResponse { refreshed, total })
}

/// POST /api/seals/:id/apply - Mark a seal as applied.
pub async fn apply_seal(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<SealList> {
    state.inventory.mark_applied(&id).await?;
    success(current_list(&state).await)
}

/// DELETE /api/seals/:id?confirm=true - Delete a seal record.
///
/// Without `confirm=true` the request counts as a cancelled confirmation.
pub async fn delete_seal(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<DeleteQuery>,
) -> ApiResult<DeleteResponse> {
    let outcome = state.inventory.remove(&id, &params.confirm).await?;
    success(DeleteResponse {
        deleted: outcome == RemoveOutcome::Deleted,
    })
}

/// GET /api/seals/export.csv - Download the whole list as CSV.
pub async fn export_seals(State(state): State<AppState>) -> Result<Response, AppError> {
    let body = state.inventory.export_csv().await;
    let disposition = format!("attachment; filename=\"{}\"", CSV_FILE_NAME);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
