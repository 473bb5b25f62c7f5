//! Member import endpoints
//!
//! `POST /api/members/import` accepts a multipart upload whose `file` field
//! holds a CSV or TSV export, normalizes it and stores the accepted rows.
//! Rows that fail validation are reported back, not stored.

use axum::{
    extract::{multipart::MultipartError, Multipart, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{TimeZone, Utc};
use meetup_common::db::members::save_members;
use meetup_common::{run_import, MemberRecord, PersistMode};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::layout::write_members_csv;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Multipart field carrying the uploaded file
const FILE_FIELD: &str = "file";

/// Query parameters for an import
#[derive(Debug, Default, Deserialize)]
pub struct ImportQuery {
    /// Overrides the configured persist mode for this upload
    pub mode: Option<PersistMode>,
}

/// Import result
#[derive(Debug, Serialize, Deserialize)]
pub struct ImportResponse {
    pub success: bool,
    /// Rows written to the member table
    pub imported: usize,
    /// `Row N: reason` for every rejected row
    pub errors: Vec<String>,
}

/// POST /api/members/import
pub async fn import_members(
    State(state): State<AppState>,
    Query(query): Query<ImportQuery>,
    mut multipart: Multipart,
) -> ApiResult<Json<ImportResponse>> {
    let (filename, bytes) = read_upload(&mut multipart).await?;

    let text = String::from_utf8(bytes)
        .map_err(|_| ApiError::BadRequest("Uploaded file is not valid UTF-8 text".to_string()))?;

    let outcome = run_import(&text, &state.synonyms, &state.import.policy)?;

    let mode = query.mode.unwrap_or(state.import.persist_mode);
    let imported = save_members(&state.db, &outcome.accepted, mode, state.import.batch_size).await?;

    info!(
        file = %filename,
        mode = ?mode,
        imported,
        rejected = outcome.rejected.len(),
        "Member import complete"
    );

    Ok(Json(ImportResponse {
        success: true,
        imported,
        errors: outcome.messages(),
    }))
}

/// Pull the `file` field out of the multipart body; other fields are skipped
async fn read_upload(multipart: &mut Multipart) -> ApiResult<(String, Vec<u8>)> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;
        if bytes.is_empty() {
            return Err(ApiError::BadRequest("Uploaded file is empty".to_string()));
        }
        return Ok((filename, bytes.to_vec()));
    }

    Err(ApiError::BadRequest("No file uploaded".to_string()))
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!("Rejected oversized upload: {}", err.body_text());
        ApiError::PayloadTooLarge(err.body_text())
    } else {
        ApiError::BadRequest(err.body_text())
    }
}

/// GET /api/members/import/template
///
/// Header row plus one filled-in example member.
pub async fn download_template() -> ApiResult<impl IntoResponse> {
    let bytes = write_members_csv([&template_example()])?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"members_template.csv\"",
            ),
        ],
        bytes,
    ))
}

fn template_example() -> MemberRecord {
    let joined = Utc.with_ymd_and_hms(2024, 6, 6, 0, 0, 0).single().unwrap_or_else(Utc::now);

    MemberRecord {
        phone: Some("+33 6 12 34 56 78".to_string()),
        company: Some("Example Corp".to_string()),
        city: Some("Paris".to_string()),
        bio: Some("Rust enthusiast".to_string()),
        title: Some("Software Engineer".to_string()),
        linkedin_url: Some("https://linkedin.com/in/jeandupont".to_string()),
        interests: vec!["Rust".to_string(), "Open source".to_string()],
        total_responses: Some(10),
        responded_yes: Some(8),
        responded_maybe: Some(1),
        responded_no: Some(1),
        meetups_attended: Some(7),
        absences: Some(1),
        has_photo: true,
        is_on_mailing_list: true,
        last_attended: Some(joined),
        ..MemberRecord::new("Jean Dupont", "jean.dupont@example.com", joined)
    }
}

/// Build import routes
pub fn import_routes() -> Router<AppState> {
    Router::new()
        .route("/api/members/import", post(import_members))
        .route("/api/members/import/template", get(download_template))
}

#[cfg(test)]
mod tests {
    use super::*;
    use meetup_common::{ImportPolicy, SynonymTable};

    #[test]
    fn test_template_reimports_cleanly() {
        let bytes = write_members_csv([&template_example()]).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        let outcome = run_import(&text, &SynonymTable::default(), &ImportPolicy::default()).unwrap();
        assert!(outcome.rejected.is_empty());
        assert_eq!(outcome.accepted, vec![template_example()]);
    }
}
