//! Authentication extractors.
//!
//! A caller is identified by a bearer token (`Authorization: Bearer` or
//! `X-JWT`) or, failing that, by the `CurrentUser` stored in the session at
//! login.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use tower_sessions::Session;

use crate::error::{AppError, set_sentry_user};
use crate::models::{CurrentUser, session_keys};
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Header carrying a raw access token, also echoed on login responses.
pub const JWT_HEADER: &str = "x-jwt";

/// Extractor that requires an authenticated caller.
///
/// Rejects with 401 when neither a valid token nor a session identity is
/// present.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, user {}!", user.id)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = if let Some(token) = bearer_token(&parts.headers) {
            let claims = state.tokens().verify(token)?;
            AuthService::new(state.store())
                .resolve_caller(&claims)
                .await?
        } else {
            session_user(parts)
                .await?
                .ok_or(AuthError::Unauthenticated)?
        };

        set_sentry_user(&user.id, user.email.as_ref().map(|e| e.as_str()));
        tracing::Span::current().record("user_id", tracing::field::display(user.id));

        Ok(Self(user))
    }
}

/// Token from `Authorization: Bearer <jwt>`, else from `X-JWT`.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let from_authorization = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);

    from_authorization
        .or_else(|| {
            headers
                .get(JWT_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
        })
        .filter(|token| !token.is_empty())
}

async fn session_user(parts: &Parts) -> Result<Option<CurrentUser>, AuthError> {
    let Some(session) = parts.extensions.get::<Session>() else {
        return Ok(None);
    };

    Ok(session.get(session_keys::CURRENT_USER).await?)
}

/// Helper to set the current user in the session.
///
/// The session ID is cycled first so a pre-login session cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Helper to end the session (logout).
///
/// # Errors
///
/// Returns an error if the session store cannot be updated.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
