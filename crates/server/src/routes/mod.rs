//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (store ping)
//! GET  /avatar/*               - Static avatar files
//!
//! # Auth
//! POST /signup                 - Create a local account (rate limited)
//! POST /auth/local/login       - Password login, issues session + token (rate limited)
//! GET  /auth/user              - Current user
//! GET  /auth/logout            - End session
//! POST /auth/logout            - End session
//!
//! # Waitlists (requires auth)
//! GET    /waitlists?search=    - List own waitlists
//! POST   /waitlists            - Create
//! GET    /waitlists/{slug}     - Read
//! PUT    /waitlists/{slug}     - Rename / reconfigure
//! DELETE /waitlists/{slug}     - Archive
//! ```

pub mod auth;
pub mod health;
pub mod waitlists;

use axum::{
    Router,
    extract::{FromRequest, FromRequestParts},
    http::Request,
    middleware::from_fn,
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tower_sessions::SessionStore;
use tracing::Span;

use crate::error::AppError;
use crate::middleware::{
    auth_rate_limiter, create_session_layer, rate_limit::RateLimitConfigError,
    request_id_middleware, security_headers_middleware,
};
use crate::state::AppState;

/// JSON body extractor whose rejections render as [`AppError`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Query string extractor whose rejections render as [`AppError`].
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

/// Create the signup and login routes, rate limited per client IP.
///
/// # Errors
///
/// Returns `RateLimitConfigError` if the limiter cannot be built.
pub fn credential_routes(trust_proxy: bool) -> Result<Router<AppState>, RateLimitConfigError> {
    Ok(Router::new()
        .route("/signup", post(auth::signup))
        .route("/auth/local/login", post(auth::login))
        .layer(auth_rate_limiter(trust_proxy)?))
}

/// Create the session-backed auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/user", get(auth::user))
        .route("/logout", get(auth::logout).post(auth::logout))
}

/// Create the waitlist routes router.
pub fn waitlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(waitlists::list).post(waitlists::create))
        .route(
            "/{slug}",
            get(waitlists::show)
                .put(waitlists::update)
                .delete(waitlists::delete),
        )
}

/// Create all API routes.
///
/// # Errors
///
/// Returns `RateLimitConfigError` if the limiter cannot be built.
pub fn routes(trust_proxy: bool) -> Result<Router<AppState>, RateLimitConfigError> {
    Ok(Router::new()
        .merge(credential_routes(trust_proxy)?)
        .nest("/auth", auth_routes())
        .nest("/waitlists", waitlist_routes()))
}

/// Build the complete application: routes, health checks, avatar files and
/// the middleware stack, bound to `state`.
///
/// `sessions` is the session backend; the server passes the `PostgreSQL`
/// store and tests pass `tower_sessions::MemoryStore`.
///
/// # Errors
///
/// Returns `RateLimitConfigError` if the limiter cannot be built.
pub fn app<S>(state: AppState, sessions: S) -> Result<Router, RateLimitConfigError>
where
    S: SessionStore + Clone,
{
    let session_layer = create_session_layer(sessions, state.config());
    let avatars = ServeDir::new(&state.config().avatar_path);

    Ok(Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(routes(state.config().trust_proxy)?)
        .nest_service("/avatar", avatars)
        .layer(session_layer)
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        user_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state))
}
