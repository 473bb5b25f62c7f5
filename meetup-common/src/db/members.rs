//! Member persistence
//!
//! Bulk write of import batches plus the list/detail/delete/export reads the
//! admin service needs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{MemberRecord, PersistMode};
use crate::{Error, Result};

/// A persisted member with its system-managed columns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredMember {
    pub id: Uuid,
    #[serde(flatten)]
    pub record: MemberRecord,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Member columns written by an import, in insert order
const RECORD_COLUMNS: &str = "name, email, phone, company, city, bio, title, \
    meetup_user_id, meetup_member_id, meetup_url, linkedin_url, twitter_url, facebook_url, \
    interests, total_responses, responded_yes, responded_maybe, responded_no, \
    meetups_attended, absences, has_photo, is_assistant_organizer, is_on_mailing_list, \
    join_date, last_active, last_attended";

/// Columns refreshed when an upsert hits an existing email
const UPSERT_UPDATE: &str = " ON CONFLICT(email) DO UPDATE SET \
    name = excluded.name, phone = excluded.phone, company = excluded.company, \
    city = excluded.city, bio = excluded.bio, title = excluded.title, \
    meetup_user_id = excluded.meetup_user_id, meetup_member_id = excluded.meetup_member_id, \
    meetup_url = excluded.meetup_url, linkedin_url = excluded.linkedin_url, \
    twitter_url = excluded.twitter_url, facebook_url = excluded.facebook_url, \
    interests = excluded.interests, total_responses = excluded.total_responses, \
    responded_yes = excluded.responded_yes, responded_maybe = excluded.responded_maybe, \
    responded_no = excluded.responded_no, meetups_attended = excluded.meetups_attended, \
    absences = excluded.absences, has_photo = excluded.has_photo, \
    is_assistant_organizer = excluded.is_assistant_organizer, \
    is_on_mailing_list = excluded.is_on_mailing_list, join_date = excluded.join_date, \
    last_active = excluded.last_active, last_attended = excluded.last_attended, \
    updated_at = excluded.updated_at";

/// Bound parameters per inserted row: `id`, the record columns,
/// `created_at` and `updated_at`
const BINDS_PER_ROW: usize = 29;

/// SQLite's default `SQLITE_MAX_VARIABLE_NUMBER`
const SQLITE_MAX_VARIABLES: usize = 32766;

/// Largest chunk a single multi-row INSERT can carry
pub const MAX_BATCH_SIZE: usize = SQLITE_MAX_VARIABLES / BINDS_PER_ROW;

/// Write an import batch inside one transaction.
///
/// Records are sent as multi-row inserts of at most `batch_size` rows. Any
/// failure rolls back the whole batch. Returns the number of rows written.
///
/// `batch_size` is clamped to `1..=MAX_BATCH_SIZE`.
pub async fn save_members(
    pool: &SqlitePool,
    members: &[MemberRecord],
    mode: PersistMode,
    batch_size: usize,
) -> Result<usize> {
    if members.is_empty() {
        return Ok(0);
    }

    let batch_size = batch_size.clamp(1, MAX_BATCH_SIZE);
    let now = crate::time::now().to_rfc3339();
    let mut tx = pool.begin().await?;
    let mut written = 0usize;

    for (chunk_index, chunk) in members.chunks(batch_size).enumerate() {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "INSERT INTO members (id, {}, created_at, updated_at) ",
            RECORD_COLUMNS
        ));

        builder.push_values(chunk, |mut row, member| {
            row.push_bind(Uuid::new_v4().to_string())
                .push_bind(member.name.clone())
                .push_bind(member.email.clone())
                .push_bind(member.phone.clone())
                .push_bind(member.company.clone())
                .push_bind(member.city.clone())
                .push_bind(member.bio.clone())
                .push_bind(member.title.clone())
                .push_bind(member.meetup_user_id.clone())
                .push_bind(member.meetup_member_id.clone())
                .push_bind(member.meetup_url.clone())
                .push_bind(member.linkedin_url.clone())
                .push_bind(member.twitter_url.clone())
                .push_bind(member.facebook_url.clone())
                .push_bind(interests_json(&member.interests))
                .push_bind(member.total_responses)
                .push_bind(member.responded_yes)
                .push_bind(member.responded_maybe)
                .push_bind(member.responded_no)
                .push_bind(member.meetups_attended)
                .push_bind(member.absences)
                .push_bind(member.has_photo)
                .push_bind(member.is_assistant_organizer)
                .push_bind(member.is_on_mailing_list)
                .push_bind(member.join_date.to_rfc3339())
                .push_bind(member.last_active.to_rfc3339())
                .push_bind(member.last_attended.map(|dt| dt.to_rfc3339()))
                .push_bind(now.clone())
                .push_bind(now.clone());
        });

        if mode == PersistMode::Upsert {
            builder.push(UPSERT_UPDATE);
        }

        let result = builder.build().execute(&mut *tx).await?;
        written += result.rows_affected() as usize;
        debug!(chunk = chunk_index, rows = chunk.len(), "Wrote member chunk");
    }

    tx.commit().await?;

    info!(written, mode = ?mode, "Saved member import batch");
    Ok(written)
}

/// Total number of members
pub async fn count_members(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM members")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// One page of members ordered by name
pub async fn list_members(pool: &SqlitePool, limit: i64, offset: i64) -> Result<Vec<StoredMember>> {
    let rows = sqlx::query(&format!(
        "SELECT id, {}, created_at, updated_at FROM members \
         ORDER BY name COLLATE NOCASE, email LIMIT ? OFFSET ?",
        RECORD_COLUMNS
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    rows.iter().map(member_from_row).collect()
}

/// Every member ordered by name (CSV export)
pub async fn load_all_members(pool: &SqlitePool) -> Result<Vec<StoredMember>> {
    let rows = sqlx::query(&format!(
        "SELECT id, {}, created_at, updated_at FROM members ORDER BY name COLLATE NOCASE, email",
        RECORD_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    rows.iter().map(member_from_row).collect()
}

/// Load a member by id
pub async fn load_member(pool: &SqlitePool, id: Uuid) -> Result<Option<StoredMember>> {
    let row = sqlx::query(&format!(
        "SELECT id, {}, created_at, updated_at FROM members WHERE id = ?",
        RECORD_COLUMNS
    ))
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(member_from_row).transpose()
}

/// Delete a member by id; `false` if no such member
pub async fn delete_member(pool: &SqlitePool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM members WHERE id = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

fn interests_json(interests: &[String]) -> String {
    serde_json::to_string(interests).unwrap_or_else(|_| "[]".to_string())
}

fn stored_time(row: &SqliteRow, column: &str) -> Result<DateTime<Utc>> {
    let value: String = row.try_get(column)?;
    crate::time::parse_stored(&value)
        .ok_or_else(|| Error::Internal(format!("Invalid timestamp in members.{}: {}", column, value)))
}

fn member_from_row(row: &SqliteRow) -> Result<StoredMember> {
    let id: String = row.try_get("id")?;
    let interests: String = row.try_get("interests")?;
    let last_attended: Option<String> = row.try_get("last_attended")?;

    let record = MemberRecord {
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        company: row.try_get("company")?,
        city: row.try_get("city")?,
        bio: row.try_get("bio")?,
        title: row.try_get("title")?,
        meetup_user_id: row.try_get("meetup_user_id")?,
        meetup_member_id: row.try_get("meetup_member_id")?,
        meetup_url: row.try_get("meetup_url")?,
        linkedin_url: row.try_get("linkedin_url")?,
        twitter_url: row.try_get("twitter_url")?,
        facebook_url: row.try_get("facebook_url")?,
        interests: serde_json::from_str(&interests)?,
        total_responses: row.try_get("total_responses")?,
        responded_yes: row.try_get("responded_yes")?,
        responded_maybe: row.try_get("responded_maybe")?,
        responded_no: row.try_get("responded_no")?,
        meetups_attended: row.try_get("meetups_attended")?,
        absences: row.try_get("absences")?,
        has_photo: row.try_get("has_photo")?,
        is_assistant_organizer: row.try_get("is_assistant_organizer")?,
        is_on_mailing_list: row.try_get("is_on_mailing_list")?,
        join_date: stored_time(row, "join_date")?,
        last_active: stored_time(row, "last_active")?,
        last_attended: match last_attended {
            Some(value) => Some(crate::time::parse_stored(&value).ok_or_else(|| {
                Error::Internal(format!("Invalid timestamp in members.last_attended: {}", value))
            })?),
            None => None,
        },
    };

    Ok(StoredMember {
        id: Uuid::parse_str(&id)
            .map_err(|e| Error::Internal(format!("Invalid member id {}: {}", id, e)))?,
        record,
        created_at: stored_time(row, "created_at")?,
        updated_at: stored_time(row, "updated_at")?,
    })
}
