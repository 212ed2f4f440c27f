// Request extractors
//
// AuthenticatedCaller: valid `Authorization: Bearer <token>` or 401
// AdminCaller: AuthenticatedCaller with the admin role, or 403
// ApiJson: JSON body whose rejections come back as 400 in the error envelope

use super::response::ApiError;
use super::AppState;
use crate::auth::{require_admin, Caller};
use crate::error::RegistryError;
use crate::validation::FieldError;
use axum::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::Json;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct AuthenticatedCaller(pub Caller);

#[derive(Debug, Clone)]
pub struct AdminCaller(pub Caller);

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedCaller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(existing) = parts.extensions.get::<Caller>() {
            return Ok(AuthenticatedCaller(existing.clone()));
        }

        let token = bearer_token(&parts.headers).ok_or(RegistryError::Unauthorized)?;
        let caller = state.auth.authenticate(token)?;
        debug!(caller = %caller.id, role = caller.role.as_str(), "caller authenticated");

        parts.extensions.insert(caller.clone());
        Ok(AuthenticatedCaller(caller))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminCaller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthenticatedCaller(caller) =
            AuthenticatedCaller::from_request_parts(parts, state).await?;
        require_admin(&caller)?;
        Ok(AdminCaller(caller))
    }
}

/// `Json<T>` that fails with `ValidationFailed` instead of axum's plain-text 4xx
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(body_rejected(&rejection).into()),
        }
    }
}

const DATA_ERROR_PREFIX: &str = "Failed to deserialize the JSON body into the target type: ";

/// Split axum's data-error text into (field path, serde message)
fn split_data_error(text: &str) -> Option<(&str, &str)> {
    let detail = text.strip_prefix(DATA_ERROR_PREFIX)?;
    let (path, message) = detail.split_once(": ")?;
    let is_path = !path.is_empty()
        && path
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '[' | ']'));
    is_path.then_some((path, message))
}

fn body_rejected(rejection: &JsonRejection) -> RegistryError {
    let text = rejection.body_text();
    warn!(status = %rejection.status(), error = %text, "request body rejected");

    let error = match rejection {
        JsonRejection::JsonDataError(_) => split_data_error(&text)
            .map(|(field, message)| FieldError::new(field, message))
            .unwrap_or_else(|| FieldError::new("body", text.as_str())),
        _ => FieldError::new("body", text.as_str()),
    };

    RegistryError::ValidationFailed(vec![error])
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(bearer_token(&headers), Some("abc123"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc123"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer   "));
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn test_split_data_error() {
        let text = "Failed to deserialize the JSON body into the target type: \
                    value: invalid type: integer `123`, expected a string at line 1 column 24";
        let (field, message) = split_data_error(text).unwrap();
        assert_eq!(field, "value");
        assert!(message.starts_with("invalid type: integer"));

        // Root-level errors carry no field path
        let root = "Failed to deserialize the JSON body into the target type: \
                    invalid type: sequence, expected struct NewCategory at line 1 column 1";
        assert_eq!(split_data_error(root), None);

        let content_type = "Expected request with `Content-Type: application/json`";
        assert_eq!(split_data_error(content_type), None);
    }
}
