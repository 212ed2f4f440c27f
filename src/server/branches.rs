// /api/branches handlers

use super::extract::{AdminCaller, ApiJson, AuthenticatedCaller};
use super::response::{ApiError, ApiResponse};
use super::{blocking, AppState};
use crate::branch::{BranchRecord, NewBranch, UpdateBranch};
use crate::error::RegistryError;
use crate::record::Record;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tracing::debug;
use uuid::Uuid;

/// An id that is not a UUID cannot name any branch
fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw)
        .map_err(|_| RegistryError::not_found(BranchRecord::ENTITY, raw).into())
}

/// GET /api/branches - Active branches
pub async fn list_active(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
) -> Result<impl IntoResponse, ApiError> {
    debug!(caller = %caller.id, "list active branches");
    let listing = blocking(move || state.branches.list_active()).await?;
    Ok(Json(ApiResponse::listing(listing, "Branches retrieved successfully")))
}

/// GET /api/branches/all - Every branch (admin)
pub async fn list_all(
    State(state): State<AppState>,
    AdminCaller(caller): AdminCaller,
) -> Result<impl IntoResponse, ApiError> {
    debug!(caller = %caller.id, "list all branches");
    let listing = blocking(move || state.branches.list_all()).await?;
    Ok(Json(ApiResponse::listing(listing, "All branches retrieved successfully")))
}

/// GET /api/branches/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    AuthenticatedCaller(_caller): AuthenticatedCaller,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let branch = blocking(move || state.branches.get_by_id(id)).await?;
    Ok(Json(ApiResponse::ok(branch, "Branch retrieved successfully")))
}

/// POST /api/branches (admin)
pub async fn create(
    State(state): State<AppState>,
    AdminCaller(caller): AdminCaller,
    ApiJson(input): ApiJson<NewBranch>,
) -> Result<impl IntoResponse, ApiError> {
    debug!(caller = %caller.id, "create branch");
    let branch = blocking(move || state.branches.create(input)).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(branch, "Branch created successfully")),
    ))
}

/// PUT /api/branches/:id (admin)
pub async fn update(
    State(state): State<AppState>,
    AdminCaller(caller): AdminCaller,
    Path(id): Path<String>,
    ApiJson(changes): ApiJson<UpdateBranch>,
) -> Result<impl IntoResponse, ApiError> {
    debug!(caller = %caller.id, branch_id = %id, "update branch");
    let id = parse_id(&id)?;
    let branch = blocking(move || state.branches.update(id, changes)).await?;
    Ok(Json(ApiResponse::ok(branch, "Branch updated successfully")))
}

/// DELETE /api/branches/:id (admin)
pub async fn delete(
    State(state): State<AppState>,
    AdminCaller(caller): AdminCaller,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    debug!(caller = %caller.id, branch_id = %id, "delete branch");
    let id = parse_id(&id)?;
    let branch = blocking(move || state.branches.delete(id)).await?;
    Ok(Json(ApiResponse::ok(branch, "Branch deleted successfully")))
}

/// PATCH /api/branches/:id/toggle-status (admin)
pub async fn toggle_status(
    State(state): State<AppState>,
    AdminCaller(caller): AdminCaller,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    debug!(caller = %caller.id, branch_id = %id, "toggle branch status");
    let id = parse_id(&id)?;
    let branch = blocking(move || state.branches.toggle_status(id)).await?;
    let message = if branch.is_active {
        "Branch activated successfully"
    } else {
        "Branch deactivated successfully"
    };
    Ok(Json(ApiResponse::ok(branch, message)))
}
