// Response envelopes and error → status mapping

use crate::error::RegistryError;
use crate::record::Listing;
use crate::validation::FieldError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// API Response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
            total: None,
        }
    }
}

impl<R> ApiResponse<Vec<R>> {
    pub fn listing(listing: Listing<R>, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            total: Some(listing.total),
            data: listing.records,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<FieldError>,
}

/// Registry error on its way out as an HTTP response
#[derive(Debug)]
pub struct ApiError(pub RegistryError);

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            RegistryError::ValidationFailed(_) | RegistryError::Conflict { .. } => {
                StatusCode::BAD_REQUEST
            }
            RegistryError::NotFound { .. } => StatusCode::NOT_FOUND,
            RegistryError::Unauthorized => StatusCode::UNAUTHORIZED,
            RegistryError::Forbidden => StatusCode::FORBIDDEN,
            RegistryError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match &self.0 {
            RegistryError::ValidationFailed(_) => "Validation failed".to_string(),
            // Details were logged where the fault happened
            RegistryError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        let body = ErrorBody {
            success: false,
            message,
            errors: self.0.field_errors().to_vec(),
        };

        (status, Json(body)).into_response()
    }
}
