//! User API types

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::api::extractors::ValidationOrder;
use crate::core::constants::{USER_EMAIL_MAX_LEN, USER_NAME_MAX_LEN};
use crate::data::filters::FilterDiagnostic;
use crate::data::types::{NewUser, UserChanges, UserRow};

/// User DTO for API responses
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRow> for UserDto {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            email_verified_at: row
                .email_verified_at
                .and_then(|ts| DateTime::from_timestamp(ts, 0)),
            created_at: DateTime::from_timestamp(row.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::from_timestamp(row.updated_at, 0).unwrap_or_default(),
        }
    }
}

/// Grid query: filter and sort arrive as JSON-encoded strings
#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListUsersQuery {
    /// `[field, op, value]` or `[left, "and"|"or", right]`
    pub filter: Option<String>,
    /// `[{"selector": "name", "desc": false}, ...]`
    pub sort: Option<String>,
    /// Rows to skip; negative values count as 0
    pub skip: Option<i64>,
    /// Page size; defaults to 20, capped at 500
    pub take: Option<i64>,
}

impl ValidationOrder for ListUsersQuery {}

/// One page of users
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserListResponse {
    pub data: Vec<UserDto>,
    /// Rows matching the filter, independent of skip/take
    #[serde(rename = "totalCount")]
    pub total_count: u64,
    /// Parts of the filter that were ignored or forced empty
    #[serde(default, skip_serializing_if = "Vec::is_empty", skip_deserializing)]
    pub diagnostics: Vec<FilterDiagnostic>,
}

/// Optional filter for the export endpoints
#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExportUsersQuery {
    pub filter: Option<String>,
}

impl ValidationOrder for ExportUsersQuery {}

/// Request body for creating a user
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(
        required(message = "The name field is required."),
        custom(function = "validate_name")
    )]
    pub name: Option<String>,

    #[validate(
        required(message = "The email field is required."),
        email(message = "The email field must be a valid email address."),
        custom(function = "validate_email_length")
    )]
    pub email: Option<String>,
}

impl ValidationOrder for CreateUserRequest {
    const FIELD_ORDER: &'static [&'static str] = &["name", "email"];
}

impl CreateUserRequest {
    /// Trimmed values for insertion; `None` if validation was skipped
    pub fn to_new_user(&self) -> Option<NewUser> {
        Some(NewUser {
            name: self.name.as_deref()?.trim().to_string(),
            email: self.email.as_deref()?.trim().to_string(),
            email_verified_at: None,
        })
    }
}

/// Request body for PUT/PATCH; absent fields keep their value
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(custom(function = "validate_name"))]
    pub name: Option<String>,

    #[validate(
        email(message = "The email field must be a valid email address."),
        custom(function = "validate_email_length")
    )]
    pub email: Option<String>,
}

impl ValidationOrder for UpdateUserRequest {
    const FIELD_ORDER: &'static [&'static str] = &["name", "email"];
}

impl UpdateUserRequest {
    pub fn to_changes(&self) -> UserChanges {
        UserChanges {
            name: self.name.as_deref().map(|n| n.trim().to_string()),
            email: self.email.as_deref().map(|e| e.trim().to_string()),
        }
    }
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// Name must be non-blank and at most 255 characters after trimming
fn validate_name(name: &str) -> Result<(), ValidationError> {
    let len = name.trim().chars().count() as u64;
    if len == 0 {
        return Err(invalid("name_required", "The name field is required."));
    }
    if len > USER_NAME_MAX_LEN {
        return Err(invalid(
            "name_length",
            "The name field must not be greater than 255 characters.",
        ));
    }
    Ok(())
}

fn validate_email_length(email: &str) -> Result<(), ValidationError> {
    if email.trim().chars().count() as u64 > USER_EMAIL_MAX_LEN {
        return Err(invalid(
            "email_length",
            "The email field must not be greater than 255 characters.",
        ));
    }
    Ok(())
}
