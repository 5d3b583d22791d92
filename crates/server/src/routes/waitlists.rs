//! Waitlist route handlers.
//!
//! Thin JSON adapters over [`WaitlistService`]; every handler requires an
//! authenticated caller.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use openwaitlist_core::{UserId, WaitlistId};

use super::{AppJson, AppQuery};
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::Waitlist;
use crate::services::waitlists::{WaitlistInput, WaitlistService};
use crate::state::AppState;

/// Create/update request body. Flags default to `false` when omitted.
#[derive(Debug, Deserialize)]
pub struct WaitlistRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub show_vendor_branding: bool,
}

impl From<WaitlistRequest> for WaitlistInput {
    fn from(request: WaitlistRequest) -> Self {
        Self {
            name: request.name,
            is_public: request.is_public,
            show_vendor_branding: request.show_vendor_branding,
        }
    }
}

/// Query parameters for the list endpoint.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
}

/// A waitlist as returned by the API.
#[derive(Debug, Serialize)]
pub struct WaitlistResponse {
    pub id: WaitlistId,
    pub slug: String,
    pub name: String,
    pub owner_user_id: UserId,
    pub is_public: bool,
    pub show_vendor_branding: bool,
    /// RFC 3339.
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<String>,
}

impl From<Waitlist> for WaitlistResponse {
    fn from(waitlist: Waitlist) -> Self {
        Self {
            id: waitlist.id,
            slug: waitlist.slug,
            name: waitlist.name,
            owner_user_id: waitlist.owner_user_id,
            is_public: waitlist.is_public,
            show_vendor_branding: waitlist.show_vendor_branding,
            created_at: waitlist.created_at.to_rfc3339(),
            archived_at: waitlist.state.archived_at().map(|at| at.to_rfc3339()),
        }
    }
}

/// List response body.
#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub waitlists: Vec<WaitlistResponse>,
    pub total: usize,
}

/// List the caller's waitlists.
pub async fn list(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListQuery>,
) -> Result<Json<ListResponse>> {
    let page = WaitlistService::new(state.store())
        .list(user.id, query.search.as_deref())
        .await?;

    Ok(Json(ListResponse {
        total: page.total,
        waitlists: page.waitlists.into_iter().map(Into::into).collect(),
    }))
}

/// Create a waitlist.
pub async fn create(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    AppJson(request): AppJson<WaitlistRequest>,
) -> Result<(StatusCode, Json<WaitlistResponse>)> {
    let waitlist = WaitlistService::new(state.store())
        .create(user.id, request.into())
        .await?;

    Ok((StatusCode::CREATED, Json(waitlist.into())))
}

/// Get a waitlist by slug.
pub async fn show(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<WaitlistResponse>> {
    let waitlist = WaitlistService::new(state.store())
        .get(user.id, &slug)
        .await?;

    Ok(Json(waitlist.into()))
}

/// Update a waitlist by slug. The response carries the new slug.
pub async fn update(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    AppJson(request): AppJson<WaitlistRequest>,
) -> Result<Json<WaitlistResponse>> {
    let waitlist = WaitlistService::new(state.store())
        .update(user.id, &slug, request.into())
        .await?;

    Ok(Json(waitlist.into()))
}

/// Archive a waitlist by slug.
pub async fn delete(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<StatusCode> {
    WaitlistService::new(state.store())
        .delete(user.id, &slug)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
