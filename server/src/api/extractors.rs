//! Path and validation extractors for API routes
//!
//! Rejections answer in the same `{error, code, message}` shape as
//! [`ApiError`](crate::api::types::ApiError). Input that parses but breaks a
//! rule is a 422 carrying only the first message; fields are checked in the
//! order the request type declares through [`ValidationOrder`].

use std::ops::Deref;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

/// Field order used to pick the first validation message
pub trait ValidationOrder {
    const FIELD_ORDER: &'static [&'static str] = &[];
}

/// Numeric user id from `/users-json/{id}`.
///
/// Anything that is not an integer cannot name a user, so it rejects as 404.
#[derive(Debug, Clone, Copy)]
pub struct UserPath {
    pub id: i64,
}

impl<S> FromRequestParts<S> for UserPath
where
    S: Send + Sync,
{
    type Rejection = ValidationRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ValidationRejection::UnknownUser)?;

        raw.parse::<i64>()
            .map(|id| Self { id })
            .map_err(|_| ValidationRejection::UnknownUser)
    }
}

/// Validation rejection with structured error response
#[derive(Debug)]
pub enum ValidationRejection {
    /// Path id is not an integer
    UnknownUser,
    /// Failed to parse query string
    Query(QueryRejection),
    /// Failed to parse JSON body
    Json(JsonRejection),
    /// First message from the failed validation rules
    Validation(String),
}

impl IntoResponse for ValidationRejection {
    fn into_response(self) -> Response {
        let (status, error, code, message) = match self {
            Self::UnknownUser => (
                StatusCode::NOT_FOUND,
                "not_found",
                "USER_NOT_FOUND",
                "User not found".to_string(),
            ),
            Self::Query(rejection) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "QUERY_PARSE_ERROR",
                rejection.body_text(),
            ),
            Self::Json(JsonRejection::JsonDataError(rejection)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "JSON_DATA_ERROR",
                rejection.body_text(),
            ),
            Self::Json(rejection) => (
                StatusCode::BAD_REQUEST,
                "bad_request",
                "JSON_PARSE_ERROR",
                rejection.body_text(),
            ),
            Self::Validation(message) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "VALIDATION_ERROR",
                message,
            ),
        };
        (
            status,
            Json(serde_json::json!({
                "error": error,
                "code": code,
                "message": message
            })),
        )
            .into_response()
    }
}

/// First human-readable message: declared fields first, then the rest by name
pub fn first_validation_message(errors: &ValidationErrors, order: &[&str]) -> String {
    let field_errors = errors.field_errors();
    let mut fields: Vec<&str> = field_errors.keys().map(|k| k.as_ref()).collect();
    fields.sort_by_key(|field| {
        (
            order.iter().position(|o| o == field).unwrap_or(order.len()),
            *field,
        )
    });

    fields
        .first()
        .and_then(|field| {
            let errs = field_errors.get(*field)?;
            let first = errs.first()?;
            Some(
                first
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("The {} field is invalid.", field)),
            )
        })
        .unwrap_or_else(|| "The given data was invalid.".to_string())
}

fn validate<T: Validate + ValidationOrder>(value: &T) -> Result<(), ValidationRejection> {
    value.validate().map_err(|errors| {
        ValidationRejection::Validation(first_validation_message(&errors, T::FIELD_ORDER))
    })
}

/// Query extractor with automatic validation.
///
/// Deserializes query parameters and validates them using the `validator` crate.
#[derive(Debug)]
pub struct ValidatedQuery<T>(pub T);

impl<T> Deref for ValidatedQuery<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + ValidationOrder,
{
    type Rejection = ValidationRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(ValidationRejection::Query)?;
        validate(&value)?;
        Ok(Self(value))
    }
}

/// JSON body extractor with automatic validation.
///
/// Deserializes JSON body and validates it using the `validator` crate.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T> Deref for ValidatedJson<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + ValidationOrder,
{
    type Rejection = ValidationRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidationRejection::Json)?;
        validate(&value)?;
        Ok(Self(value))
    }
}
