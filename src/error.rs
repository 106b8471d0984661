use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Query, Request},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{error, warn};

use crate::{auth::password::PasswordError, response::ApiResponse, users::repo::StoreError};

/// Errors surfaced by services and handlers. Every variant renders as an
/// enveloped response; internal detail is logged, never returned.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("unauthorized")]
    Unauthorized,

    #[error("user not found")]
    NotFound,

    #[error("email already registered")]
    Conflict,

    #[error("store error: {0}")]
    Store(StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "invalid credentials".into())
            }
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".into()),
            AppError::NotFound => (StatusCode::NOT_FOUND, "user not found".into()),
            AppError::Conflict => (StatusCode::CONFLICT, "email already registered".into()),
            AppError::Store(_) | AppError::Password(_) | AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".into(),
            ),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail => AppError::Conflict,
            other => AppError::Store(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else {
            warn!(%status, error = %self, "request rejected");
        }
        ApiResponse::empty(status, message).into_response()
    }
}

/// JSON body extractor whose rejection is an enveloped validation error
/// instead of axum's plain-text rejection.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => {
                warn!(reason = %rejection.body_text(), "malformed request body");
                Err(AppError::validation("invalid request"))
            }
        }
    }
}

/// Query string extractor with the same enveloped rejection as `JsonBody`.
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(QueryParams(value)),
            Err(rejection) => {
                warn!(reason = %rejection.body_text(), "malformed query string");
                Err(AppError::validation("invalid request"))
            }
        }
    }
}
