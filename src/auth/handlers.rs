use axum::{extract::State, Extension};
use tracing::instrument;

use crate::{
    auth::{
        claims::Claims,
        dto::{LoginRequest, LoginResponse},
    },
    error::{AppError, JsonBody},
    response::ApiResponse,
    state::AppState,
    users::repo_types::User,
};

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<ApiResponse<LoginResponse>, AppError> {
    let res = state.auth.login(&payload.email, &payload.password).await?;
    Ok(ApiResponse::ok("login successful", res))
}

#[instrument(skip(state, claims), fields(user_id = %claims.user_id))]
pub async fn get_me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<ApiResponse<User>, AppError> {
    let user = state.users.get(claims.user_id).await?;
    Ok(ApiResponse::ok("user retrieved", user))
}
