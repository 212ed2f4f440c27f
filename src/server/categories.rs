// /api/categories handlers

use super::extract::{AdminCaller, ApiJson, AuthenticatedCaller};
use super::response::{ApiError, ApiResponse};
use super::{blocking, AppState};
use crate::category::{CategoryRecord, NewCategory, UpdateCategory};
use crate::error::RegistryError;
use crate::record::Record;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tracing::debug;
use uuid::Uuid;

/// An id that is not a UUID cannot name any category
fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw)
        .map_err(|_| RegistryError::not_found(CategoryRecord::ENTITY, raw).into())
}

/// GET /api/categories - Active categories
pub async fn list_active(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
) -> Result<impl IntoResponse, ApiError> {
    debug!(caller = %caller.id, "list active categories");
    let listing = blocking(move || state.categories.list_active()).await?;
    Ok(Json(ApiResponse::listing(listing, "Categories retrieved successfully")))
}

/// GET /api/categories/all - Every category (admin)
pub async fn list_all(
    State(state): State<AppState>,
    AdminCaller(caller): AdminCaller,
) -> Result<impl IntoResponse, ApiError> {
    debug!(caller = %caller.id, "list all categories");
    let listing = blocking(move || state.categories.list_all()).await?;
    Ok(Json(ApiResponse::listing(listing, "All categories retrieved successfully")))
}

/// GET /api/categories/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    AuthenticatedCaller(_caller): AuthenticatedCaller,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let category = blocking(move || state.categories.get_by_id(id)).await?;
    Ok(Json(ApiResponse::ok(category, "Category retrieved successfully")))
}

/// POST /api/categories (admin)
pub async fn create(
    State(state): State<AppState>,
    AdminCaller(caller): AdminCaller,
    ApiJson(input): ApiJson<NewCategory>,
) -> Result<impl IntoResponse, ApiError> {
    debug!(caller = %caller.id, "create category");
    let category = blocking(move || state.categories.create(input)).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(category, "Category created successfully")),
    ))
}

/// PUT /api/categories/:id (admin)
pub async fn update(
    State(state): State<AppState>,
    AdminCaller(caller): AdminCaller,
    Path(id): Path<String>,
    ApiJson(changes): ApiJson<UpdateCategory>,
) -> Result<impl IntoResponse, ApiError> {
    debug!(caller = %caller.id, category_id = %id, "update category");
    let id = parse_id(&id)?;
    let category = blocking(move || state.categories.update(id, changes)).await?;
    Ok(Json(ApiResponse::ok(category, "Category updated successfully")))
}

/// DELETE /api/categories/:id (admin)
pub async fn delete(
    State(state): State<AppState>,
    AdminCaller(caller): AdminCaller,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    debug!(caller = %caller.id, category_id = %id, "delete category");
    let id = parse_id(&id)?;
    let category = blocking(move || state.categories.delete(id)).await?;
    Ok(Json(ApiResponse::ok(category, "Category deleted successfully")))
}

/// PATCH /api/categories/:id/toggle-status (admin)
pub async fn toggle_status(
    State(state): State<AppState>,
    AdminCaller(caller): AdminCaller,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    debug!(caller = %caller.id, category_id = %id, "toggle category status");
    let id = parse_id(&id)?;
    let category = blocking(move || state.categories.toggle_status(id)).await?;
    let message = if category.is_active {
        "Category activated successfully"
    } else {
        "Category deactivated successfully"
    };
    Ok(Json(ApiResponse::ok(category, message)))
}
