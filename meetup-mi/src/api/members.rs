//! Stored member browsing, deletion and CSV export

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use meetup_common::db::members;
use meetup_common::db::StoredMember;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::layout::write_members_csv;
use crate::error::{ApiError, ApiResult};
use crate::pagination::calculate_pagination;
use crate::AppState;

/// Query parameters for the member list
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    pub page: i64,
}

fn default_page() -> i64 {
    1
}

/// One page of members, ordered by name
#[derive(Debug, Serialize)]
pub struct MemberListResponse {
    pub total_members: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
    pub members: Vec<StoredMember>,
}

/// GET /api/members?page=N
pub async fn list_members(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<MemberListResponse>> {
    let total_members = members::count_members(&state.db).await?;
    let pagination = calculate_pagination(total_members, query.page, state.import.page_size);

    let members =
        members::list_members(&state.db, pagination.page_size, pagination.offset).await?;

    Ok(Json(MemberListResponse {
        total_members,
        page: pagination.page,
        page_size: pagination.page_size,
        total_pages: pagination.total_pages,
        members,
    }))
}

/// GET /api/members/:id
pub async fn get_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<StoredMember>> {
    let id = parse_member_id(&id)?;
    members::load_member(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Member {}", id)))
}

/// DELETE /api/members/:id
pub async fn delete_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_member_id(&id)?;
    if !members::delete_member(&state.db, id).await? {
        return Err(ApiError::NotFound(format!("Member {}", id)));
    }

    info!(member_id = %id, "Deleted member");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/members/export
///
/// Every stored member in the import template layout.
pub async fn export_members(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let stored = members::load_all_members(&state.db).await?;
    let bytes = write_members_csv(stored.iter().map(|m| &m.record))?;

    info!(members = stored.len(), "Exported members");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"members_export.csv\"",
            ),
        ],
        bytes,
    ))
}

fn parse_member_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Invalid member id: {}", raw)))
}

/// Build member routes
pub fn member_routes() -> Router<AppState> {
    Router::new()
        .route("/api/members", get(list_members))
        .route("/api/members/export", get(export_members))
        .route("/api/members/:id", get(get_member).delete(delete_member))
}
