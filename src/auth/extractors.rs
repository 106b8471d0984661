use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use tracing::warn;

use super::{claims::Claims, jwt::JwtKeys};
use crate::error::AppError;

/// Extracts and validates the bearer JWT, yielding its claims.
pub struct AuthUser(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                warn!("missing Authorization header");
                AppError::Unauthorized
            })?;

        // Expect "Bearer <token>"
        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                warn!("invalid auth scheme");
                AppError::Unauthorized
            })?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|e| {
            warn!(reason = %e, "invalid or expired token");
            AppError::Unauthorized
        })?;

        Ok(AuthUser(claims))
    }
}

/// Route layer for protected routes: rejects unauthenticated requests and
/// makes the verified `Claims` available as a request extension.
pub async fn require_auth(AuthUser(claims): AuthUser, mut req: Request, next: Next) -> Response {
    req.extensions_mut().insert(claims);
    next.run(req).await
}
