//! Authentication route handlers.
//!
//! Signup and password login for local accounts, plus the session endpoints
//! the dashboard uses to discover and end its login.

use axum::{
    Json,
    extract::State,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use openwaitlist_core::UserId;

use super::AppJson;
use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{JWT_HEADER, RequireAuth, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// Request / Response Types
// =============================================================================

/// Signup request body.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub display_name: Option<String>,
}

/// Signup response body.
#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub success: bool,
    pub message: String,
    pub user_id: UserId,
}

/// Login request body.
///
/// Accepts `user`/`passwd` as aliases used by older clients.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default, alias = "user")]
    pub email: String,
    #[serde(default, alias = "passwd")]
    pub password: String,
}

/// Public identity of the logged-in user.
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl From<&CurrentUser> for UserInfo {
    fn from(user: &CurrentUser) -> Self {
        Self {
            id: user.id,
            email: user.email.as_ref().map(|e| e.as_str().to_owned()),
        }
    }
}

/// Login response body.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserInfo,
    pub token: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle signup.
pub async fn signup(
    State(state): State<AppState>,
    AppJson(request): AppJson<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>)> {
    if request.email.is_empty() || request.password.is_empty() {
        return Err(AppError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    let user = AuthService::new(state.store())
        .signup(&request.email, &request.password, request.display_name)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            success: true,
            message: "User created successfully".to_string(),
            user_id: user.id,
        }),
    ))
}

/// Handle password login.
///
/// Stores the user in the session and returns a bearer token, echoed in the
/// `X-JWT` header.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    AppJson(request): AppJson<LoginRequest>,
) -> Result<Response> {
    if request.email.is_empty() || request.password.is_empty() {
        return Err(AppError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    let user = AuthService::new(state.store())
        .login(&request.email, &request.password)
        .await
        .inspect_err(|e| tracing::info!(error = %e, "Login failed"))?;

    let current = CurrentUser {
        id: user.id,
        email: Some(user.email),
    };

    set_current_user(&session, &current)
        .await
        .map_err(AuthError::from)?;
    let token = state.tokens().issue(&current)?;

    set_sentry_user(&current.id, current.email.as_ref().map(|e| e.as_str()));
    tracing::info!(user_id = %current.id, "User logged in");

    let header = HeaderValue::from_str(&token)
        .map_err(|e| AppError::Internal(format!("token is not a valid header value: {e}")))?;

    let mut response = Json(LoginResponse {
        user: UserInfo::from(&current),
        token,
    })
    .into_response();
    response.headers_mut().insert(JWT_HEADER, header);

    Ok(response)
}

/// Return the current user.
pub async fn user(RequireAuth(user): RequireAuth) -> Json<UserInfo> {
    Json(UserInfo::from(&user))
}

/// End the session.
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_user(&session)
        .await
        .map_err(AuthError::from)?;
    clear_sentry_user();

    Ok(StatusCode::NO_CONTENT)
}
