//! User API endpoints
//!
//! The grid's list endpoint plus create, read, update and delete under
//! `/users-json`.

pub mod types;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::extractors::{UserPath, ValidatedJson, ValidatedQuery};
use crate::api::types::ApiError;
use crate::data::TransactionalService;
use crate::data::filters::columns::{USER_SCHEMA, USER_SORTABLE};
use crate::data::filters::{FilterCompiler, FilterDiagnostic, parse_sort};
use crate::data::sqlite::repositories::EMAIL_TAKEN;
use crate::data::types::{ListUsersParams, PageRequest};

use types::{CreateUserRequest, ListUsersQuery, UpdateUserRequest, UserDto, UserListResponse};

/// Shared state for Users API endpoints
#[derive(Clone)]
pub struct UsersApiState {
    pub database: Arc<TransactionalService>,
}

/// Build Users API routes
pub fn routes(database: Arc<TransactionalService>) -> Router<()> {
    let state = UsersApiState { database };

    Router::new()
        .route("/", get(list_users).post(create_user))
        .route(
            "/{id}",
            get(get_user)
                .put(update_user)
                .patch(update_user)
                .delete(delete_user),
        )
        .with_state(state)
}

/// Log what the filter compiler dropped or forced empty
pub(crate) fn log_diagnostics(diagnostics: &[FilterDiagnostic]) {
    for d in diagnostics {
        tracing::warn!(
            kind = ?d.kind,
            field = d.field.as_deref().unwrap_or("-"),
            message = %d.message,
            "Filter diagnostic"
        );
    }
}

fn user_not_found() -> ApiError {
    ApiError::not_found("USER_NOT_FOUND", "User not found")
}

/// List users with grid filter, sort and paging
#[utoipa::path(
    get,
    path = "/users-json",
    tag = "users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Page of users with filtered total", body = UserListResponse),
        (status = 422, description = "Invalid sort or query parameters")
    )
)]
pub async fn list_users(
    State(state): State<UsersApiState>,
    ValidatedQuery(query): ValidatedQuery<ListUsersQuery>,
) -> Result<Json<UserListResponse>, ApiError> {
    let sort = match query.sort.as_deref() {
        Some(raw) => parse_sort(raw, USER_SORTABLE).map_err(ApiError::from_sort)?,
        None => Vec::new(),
    };

    let predicate = FilterCompiler::new(&USER_SCHEMA).compile_json(query.filter.as_deref());
    log_diagnostics(&predicate.diagnostics);

    let params = ListUsersParams {
        predicate,
        sort,
        page: PageRequest::new(query.skip, query.take),
    };

    let (rows, total_count) = state
        .database
        .repository()
        .list_users(&params)
        .await
        .map_err(ApiError::from_data)?;

    tracing::debug!(
        returned = rows.len(),
        total_count,
        skip = params.page.skip,
        take = params.page.take,
        "Listed users"
    );

    Ok(Json(UserListResponse {
        data: rows.into_iter().map(UserDto::from).collect(),
        total_count,
        diagnostics: params.predicate.diagnostics,
    }))
}

/// Get a single user
#[utoipa::path(
    get,
    path = "/users-json/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = UserDto),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<UsersApiState>,
    path: UserPath,
) -> Result<Json<UserDto>, ApiError> {
    let user = state
        .database
        .repository()
        .get_user(path.id)
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(user_not_found)?;

    Ok(Json(UserDto::from(user)))
}

/// Create a user
#[utoipa::path(
    post,
    path = "/users-json",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserDto),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn create_user(
    State(state): State<UsersApiState>,
    ValidatedJson(body): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserDto>), ApiError> {
    let new_user = body
        .to_new_user()
        .ok_or_else(|| ApiError::validation("VALIDATION_ERROR", "The given data was invalid."))?;

    let repo = state.database.repository();
    if repo
        .get_user_by_email(&new_user.email)
        .await
        .map_err(ApiError::from_data)?
        .is_some()
    {
        return Err(ApiError::validation("VALIDATION_ERROR", EMAIL_TAKEN));
    }

    let user = repo
        .create_user(&new_user)
        .await
        .map_err(ApiError::from_data)?;

    tracing::debug!(user_id = user.id, "Created user");
    Ok((StatusCode::CREATED, Json(UserDto::from(user))))
}

/// Update a user (PUT and PATCH both apply a partial update)
#[utoipa::path(
    put,
    path = "/users-json/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserDto),
        (status = 404, description = "User not found"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn update_user(
    State(state): State<UsersApiState>,
    path: UserPath,
    ValidatedJson(body): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<UserDto>, ApiError> {
    let repo = state.database.repository();

    let existing = repo
        .get_user(path.id)
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(user_not_found)?;

    let changes = body.to_changes();
    if changes.is_empty() {
        return Ok(Json(UserDto::from(existing)));
    }

    if let Some(email) = changes.email.as_deref()
        && let Some(owner) = repo
            .get_user_by_email(email)
            .await
            .map_err(ApiError::from_data)?
        && owner.id != path.id
    {
        return Err(ApiError::validation("VALIDATION_ERROR", EMAIL_TAKEN));
    }

    let user = repo
        .update_user(path.id, &changes)
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(user_not_found)?;

    tracing::debug!(user_id = user.id, "Updated user");
    Ok(Json(UserDto::from(user)))
}

/// Delete a user and their posts
#[utoipa::path(
    delete,
    path = "/users-json/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    State(state): State<UsersApiState>,
    path: UserPath,
) -> Result<StatusCode, ApiError> {
    let deleted = state
        .database
        .repository()
        .delete_user(path.id)
        .await
        .map_err(ApiError::from_data)?;

    if !deleted {
        return Err(user_not_found());
    }

    tracing::debug!(user_id = path.id, "Deleted user");
    Ok(StatusCode::NO_CONTENT)
}
