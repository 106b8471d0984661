use std::{any::Any, net::SocketAddr, time::Duration};

use axum::{
    error_handling::HandleErrorLayer,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    BoxError, Json, Router,
};
use serde_json::{json, Value};
use tower::{timeout::error::Elapsed, ServiceBuilder};
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use crate::{auth, response::ApiResponse, state::AppState, users};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .nest(
            "/api",
            Router::new()
                .merge(auth::router(state.clone()))
                .merge(users::router(state.clone()))
                .route("/health", get(health)),
        )
        .fallback(not_found)
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(timeout_response))
                .timeout(REQUEST_TIMEOUT),
        )
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, ?latency, "response");
                        } else {
                            tracing::info!(%status, ?latency, "response");
                        }
                    },
                ),
        )
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

async fn not_found() -> ApiResponse<()> {
    ApiResponse::empty(StatusCode::NOT_FOUND, "not found")
}

async fn timeout_response(err: BoxError) -> ApiResponse<()> {
    if err.is::<Elapsed>() {
        tracing::warn!(timeout = ?REQUEST_TIMEOUT, "request timed out");
        ApiResponse::empty(StatusCode::REQUEST_TIMEOUT, "request timed out")
    } else {
        tracing::error!(error = %err, "middleware failed");
        ApiResponse::empty(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
    }
}

/// Turns a handler panic into the generic 500 envelope. Details were already
/// logged by the process panic hook.
fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    tracing::error!(panic = %detail, "request handler panicked");
    ApiResponse::empty(StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
}

pub async fn serve(app: Router, addr: SocketAddr) -> anyhow::Result<()> {
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
