use crate::state::AppState;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};

pub mod claims;
pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod services;

pub fn router(state: AppState) -> Router<AppState> {
    let me = get(handlers::get_me)
        .route_layer(middleware::from_fn_with_state(state, extractors::require_auth));

    Router::new()
        .route("/login", post(handlers::login))
        .route("/me", me)
}
