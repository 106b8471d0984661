use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{auth::extractors::require_auth, state::AppState};

pub mod dto;
pub mod handlers;
#[cfg(test)]
pub mod memory;
pub mod repo;
pub mod repo_types;
pub mod services;

pub fn router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/users", get(handlers::list_users))
        .route(
            "/users/:id",
            put(handlers::update_user).delete(handlers::delete_user),
        )
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    Router::new()
        .route("/register", post(handlers::register))
        .merge(protected)
}
