use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension,
};
use tracing::instrument;

use crate::{
    auth::claims::Claims,
    error::{AppError, JsonBody, QueryParams},
    response::ApiResponse,
    state::AppState,
    users::{
        dto::{CreateUserRequest, ListQuery, UpdateUserRequest},
        repo_types::User,
        services::ListParams,
    },
};

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateUserRequest>,
) -> Result<ApiResponse<User>, AppError> {
    let user = state.users.create(payload).await?;
    Ok(ApiResponse::created("user created", user))
}

#[instrument(skip(state, claims), fields(requested_by = %claims.user_id))]
pub async fn list_users(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    QueryParams(query): QueryParams<ListQuery>,
) -> Result<ApiResponse<Vec<User>>, AppError> {
    let users = state.users.list(ListParams::from(query)).await?;
    Ok(ApiResponse::ok("users retrieved", users))
}

#[instrument(skip(state, claims, payload), fields(requested_by = %claims.user_id))]
pub async fn update_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<UpdateUserRequest>,
) -> Result<ApiResponse<User>, AppError> {
    let user = state.users.update(&id, payload).await?;
    Ok(ApiResponse::ok("user updated", user))
}

#[instrument(skip(state, claims), fields(requested_by = %claims.user_id))]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, AppError> {
    state.users.delete(&id).await?;
    Ok(ApiResponse::empty(StatusCode::OK, "user deleted"))
}
