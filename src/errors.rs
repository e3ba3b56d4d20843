//! Centralized error handling.
//!
//! Provides a unified error type for the entire application,
//! with automatic HTTP response conversion.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication & Authorization
    #[error("Autenticación requerida")]
    Unauthorized,

    #[error("Acceso denegado")]
    Forbidden,

    #[error("Credenciales inválidas")]
    InvalidCredentials,

    // Resource errors
    #[error("Recurso no encontrado: {0}")]
    NotFound(String),

    /// Business rule conflict (barrel already assigned, sale already cancelled...)
    #[error("{0}")]
    Conflict(String),

    /// `ux_caja_abierta` rejected a write: another register is already open
    #[error("Ya existe una caja abierta")]
    RegisterAlreadyOpen,

    /// Unique constraint violation surfaced to the client as a bad request
    #[error("{0}")]
    Duplicate(String),

    // Validation
    #[error("{0}")]
    Validation(String),

    #[error("Datos inválidos")]
    InvalidFields(#[from] validator::ValidationErrors),

    // External service errors
    #[error("Error de base de datos")]
    Database(#[from] DbErr),

    #[error("Token inválido")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Error de contraseña")]
    Hashing(#[from] bcrypt::BcryptError),

    // Internal
    #[error("Error interno")]
    Internal(String),
}

/// Error response body: `{"error": ..., "details": ...}`
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl AppError {
    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized | AppError::InvalidCredentials | AppError::Jwt(_) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) | AppError::RegisterAlreadyOpen => StatusCode::CONFLICT,
            AppError::Duplicate(_) | AppError::Validation(_) | AppError::InvalidFields(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Database(_) | AppError::Hashing(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get user-facing message (hides internal details)
    fn user_message(&self) -> String {
        match self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Ocurrió un error de base de datos".to_string()
            }
            AppError::Jwt(e) => {
                tracing::debug!("JWT error: {:?}", e);
                "Token inválido o expirado".to_string()
            }
            AppError::Hashing(e) => {
                tracing::error!("Password hashing error: {:?}", e);
                "Ocurrió un error interno".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Ocurrió un error interno".to_string()
            }
            _ => self.to_string(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            AppError::InvalidFields(errors) => serde_json::to_value(errors).ok(),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: self.user_message(),
            details: self.details(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self, entity: &str) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, entity: &str) -> AppResult<T> {
        self.ok_or_else(|| AppError::not_found(entity))
    }
}

/// Convenience constructors
impl AppError {
    pub fn not_found(entity: impl Into<String>) -> Self {
        AppError::NotFound(entity.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }

    pub fn duplicate(msg: impl Into<String>) -> Self {
        AppError::Duplicate(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

/// True when the database rejected a write with a unique violation (`23505`).
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Map a unique violation to a client-facing duplicate error, keep anything else.
pub fn map_unique(err: DbErr, msg: &str) -> AppError {
    if is_unique_violation(&err) {
        tracing::warn!("Unique constraint rejected write: {}", msg);
        AppError::duplicate(msg)
    } else {
        AppError::Database(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_duplicate_is_bad_request_with_message() {
        let (status, body) = body_json(AppError::duplicate("El RUT ya está registrado")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "El RUT ya está registrado");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn test_database_error_is_generic() {
        let err = AppError::Database(DbErr::Custom("relation does not exist".into()));
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Ocurrió un error de base de datos");
    }

    #[tokio::test]
    async fn test_not_found_names_entity() {
        let (status, body) = body_json(AppError::not_found("Barril")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Recurso no encontrado: Barril");
    }

    #[tokio::test]
    async fn test_register_already_open_is_conflict() {
        let (status, body) = body_json(AppError::RegisterAlreadyOpen).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Ya existe una caja abierta");
    }

    #[test]
    fn test_custom_db_error_is_not_unique_violation() {
        let err = DbErr::Custom("boom".into());
        assert!(!is_unique_violation(&err));
        assert!(matches!(map_unique(err, "dup"), AppError::Database(_)));
    }
}
