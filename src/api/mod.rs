use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    handler::Handler,
    http::HeaderValue,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, MethodRouter},
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::instrument::WithSubscriber;
use tracing::Level;

use crate::errors::AppError;
use crate::AppState;

pub mod handlers;
pub mod pages;

/// (method, path) pairs served, as printed in the startup banner.
pub const ENDPOINTS: &[(&str, &str)] = &[
    ("GET", "/approve?token=TOKEN"),
    ("GET", "/reject?token=TOKEN"),
    ("GET", "/status?token=TOKEN"),
    ("GET", "/health"),
    ("POST", "/email-webhook"),
];

/// Build the webhook router.
///
/// Unknown paths and known paths hit with the wrong method both answer 404.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/approve", get_only(handlers::approve))
        .route("/reject", get_only(handlers::reject))
        .route("/status", get_only(handlers::status))
        .route("/health", get_only(handlers::health))
        .route(
            "/email-webhook",
            post(handlers::email_webhook).fallback(fallback_404),
        )
        .fallback(fallback_404)
        .with_state(state.clone())
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(middleware::from_fn_with_state(state, logger_middleware))
}

/// GET route that answers 404 to every other method, HEAD included.
///
/// Link scanners probe URLs with HEAD; a bare `get()` would run the handler for them.
fn get_only<H, T>(handler: H) -> MethodRouter<Arc<AppState>>
where
    H: Handler<T, Arc<AppState>>,
    T: 'static,
{
    get(handler).head(fallback_404).fallback(fallback_404)
}

async fn fallback_404() -> AppError {
    AppError::RouteNotFound
}

/// Turn a handler panic into a 500 carrying the panic message.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    AppError::Internal(anyhow::anyhow!(detail)).into_response()
}

/// Middleware: runs the rest of the stack under the application's logger.
async fn logger_middleware(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    next.run(req)
        .with_subscriber(state.logger.dispatch().clone())
        .await
}

/// Middleware: injects a unique X-Request-Id into every response.
async fn request_id_middleware(req: Request, next: Next) -> Response {
    let req_id = uuid::Uuid::new_v4().to_string();
    let mut resp = next.run(req).await;
    if let Ok(val) = HeaderValue::from_str(&req_id) {
        resp.headers_mut().insert("x-request-id", val);
    }
    resp
}

/// Middleware: injects security headers into every response.
async fn security_headers_middleware(req: Request, next: Next) -> Response {
    let mut resp = next.run(req).await;
    let headers = resp.headers_mut();

    headers.insert("X-Content-Type-Options", HeaderValue::from_static("nosniff"));
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));

    // Decisions must never be served from a cache.
    headers.insert("Cache-Control", HeaderValue::from_static("no-store"));

    // Tokens travel in the URL; keep them out of Referer.
    headers.insert("Referrer-Policy", HeaderValue::from_static("no-referrer"));

    resp
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_panic_becomes_500_with_detail() {
        let resp = handle_panic(Box::new("store exploded"));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("store exploded"));
    }
}
