//! Member import models
//!
//! `MemberRecord` is the normalized output of one accepted spreadsheet row and
//! maps one-to-one onto the columns of the `members` table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How an import batch treats emails that already exist in the member table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistMode {
    /// Plain insert; an existing email fails the whole batch
    #[default]
    Insert,
    /// Update the existing row in place, keyed by email
    Upsert,
}

/// One normalized, validated member row ready for persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberRecord {
    pub name: String,
    pub email: String,

    pub phone: Option<String>,
    pub company: Option<String>,
    pub city: Option<String>,
    pub bio: Option<String>,
    pub title: Option<String>,
    pub meetup_user_id: Option<String>,
    pub meetup_member_id: Option<String>,

    pub meetup_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub twitter_url: Option<String>,
    pub facebook_url: Option<String>,

    /// Semicolon-delimited in the source, kept in source order
    #[serde(default)]
    pub interests: Vec<String>,

    pub total_responses: Option<i64>,
    pub responded_yes: Option<i64>,
    pub responded_maybe: Option<i64>,
    pub responded_no: Option<i64>,
    pub meetups_attended: Option<i64>,
    pub absences: Option<i64>,

    pub has_photo: bool,
    pub is_assistant_organizer: bool,
    pub is_on_mailing_list: bool,

    pub join_date: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
    pub last_attended: Option<DateTime<Utc>>,
}

impl MemberRecord {
    /// Record with only identity set; every optional field empty and both
    /// defaulted dates set to `now`.
    pub fn new(name: impl Into<String>, email: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: None,
            company: None,
            city: None,
            bio: None,
            title: None,
            meetup_user_id: None,
            meetup_member_id: None,
            meetup_url: None,
            linkedin_url: None,
            twitter_url: None,
            facebook_url: None,
            interests: Vec::new(),
            total_responses: None,
            responded_yes: None,
            responded_maybe: None,
            responded_no: None,
            meetups_attended: None,
            absences: None,
            has_photo: false,
            is_assistant_organizer: false,
            is_on_mailing_list: false,
            join_date: now,
            last_active: now,
            last_attended: None,
        }
    }
}

/// A data row that did not produce a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowRejection {
    /// 1-based line number counting the header as row 1
    pub row_number: usize,
    pub reason: String,
}

impl RowRejection {
    pub fn new(row_number: usize, reason: impl Into<String>) -> Self {
        Self {
            row_number,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for RowRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row {}: {}", self.row_number, self.reason)
    }
}

/// Combined accepted/rejected result for one uploaded file
///
/// Every non-blank data row lands in exactly one of the two lists, and
/// both lists preserve input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub accepted: Vec<MemberRecord>,
    pub rejected: Vec<RowRejection>,
}

impl ImportOutcome {
    /// Number of data rows accounted for
    pub fn total_rows(&self) -> usize {
        self.accepted.len() + self.rejected.len()
    }

    /// Human-readable rejection messages (`Row N: reason`)
    pub fn messages(&self) -> Vec<String> {
        self.rejected.iter().map(ToString::to_string).collect()
    }
}
