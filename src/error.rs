// ⚠️ Error Types - shared by both registries, the stores and the HTTP layer

use crate::validation::FieldError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    /// One or more field constraints violated (every violation is listed)
    #[error("Validation failed: {}", summarize(.0))]
    ValidationFailed(Vec<FieldError>),

    /// Uniqueness violation
    #[error("{message}")]
    Conflict { message: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Authentication required")]
    Unauthorized,

    #[error("Administrator role required")]
    Forbidden,

    /// Unexpected storage/runtime fault. The message is for logs only.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RegistryError {
    pub fn conflict(message: impl Into<String>) -> Self {
        RegistryError::Conflict {
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        RegistryError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Log internal faults with the operation that hit them; pass everything through
    pub fn logged(self, entity: &str, operation: &str) -> Self {
        if let RegistryError::Internal(detail) = &self {
            tracing::error!(entity, operation, error = %detail, "registry operation failed");
        }
        self
    }

    /// Field errors carried by a `ValidationFailed`, empty otherwise
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            RegistryError::ValidationFailed(errors) => errors,
            _ => &[],
        }
    }
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<rusqlite::Error> for RegistryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(ref e, ref msg)
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                RegistryError::conflict(
                    msg.clone()
                        .unwrap_or_else(|| "Uniqueness constraint violated".to_string()),
                )
            }
            other => RegistryError::Internal(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;
