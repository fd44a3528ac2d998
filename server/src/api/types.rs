//! Shared API types
//!
//! Error responses shared by every endpoint. All errors serialize as
//! `{ "error": <kind>, "code": <CODE>, "message": <text> }`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::data::DataError;
use crate::data::filters::SortError;

/// Standard API error response
#[derive(Debug)]
pub enum ApiError {
    /// Rejected input; carries the first human-readable message
    Validation { code: String, message: String },
    NotFound { code: String, message: String },
    Internal { message: String },
}

impl ApiError {
    pub fn validation(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFound {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Storage conflicts (unique email raced past the handler check) are
    /// user-facing; everything else is logged and hidden behind a 500
    pub fn from_data(e: DataError) -> Self {
        match e {
            DataError::Conflict(message) => Self::validation("VALIDATION_ERROR", message),
            other => {
                tracing::error!(error = %other, "Data error");
                Self::internal("Database operation failed")
            }
        }
    }

    pub fn from_sort(e: SortError) -> Self {
        Self::validation("INVALID_SORT", e.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error_type, code, message) = match self {
            Self::Validation { code, message } => ("validation_error", code, message),
            Self::NotFound { code, message } => ("not_found", code, message),
            Self::Internal { message } => ("internal_error", "INTERNAL".to_string(), message),
        };
        (
            status,
            Json(serde_json::json!({
                "error": error_type,
                "code": code,
                "message": message
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_error_body() {
        let response = ApiError::validation("VALIDATION_ERROR", "The name field is required.")
            .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["message"], "The name field is required.");
    }

    #[test]
    fn test_conflict_maps_to_validation() {
        let err = ApiError::from_data(DataError::Conflict("taken".to_string()));
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_database_error_is_generic_500() {
        let response =
            ApiError::from_data(DataError::Sqlite(sqlx::Error::RowNotFound)).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["code"], "INTERNAL");
        assert_eq!(body["message"], "Database operation failed");
    }

    #[test]
    fn test_sort_error_is_validation() {
        let err = ApiError::from_sort(SortError::UnknownColumn("password".to_string()));
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
