//! CSV layout shared by the import template and the member export
//!
//! One column per [`MemberField`], headed by its English template header.
//! Every header maps back through the default synonym table, so an export
//! re-imports into the same field values under the default import policy.
//!
//! Missing counters are written as empty cells. Under
//! `NumericFallback::Zero` those cells re-import as `0`, not as missing.

use chrono::SecondsFormat;
use meetup_common::import::MemberField;
use meetup_common::MemberRecord;

use crate::error::{ApiError, ApiResult};

/// Header row in `MemberField::ALL` order
pub fn header_row() -> Vec<&'static str> {
    MemberField::ALL.iter().map(|f| f.template_header()).collect()
}

/// Render records as CSV bytes (header row first)
pub fn write_members_csv<'a>(records: impl IntoIterator<Item = &'a MemberRecord>) -> ApiResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(header_row()).map_err(csv_error)?;

    for record in records {
        let row: Vec<String> = MemberField::ALL
            .iter()
            .map(|field| cell_value(record, *field))
            .collect();
        writer.write_record(&row).map_err(csv_error)?;
    }

    writer
        .into_inner()
        .map_err(|e| ApiError::Internal(format!("CSV flush failed: {}", e)))
}

fn csv_error(err: csv::Error) -> ApiError {
    ApiError::Internal(format!("CSV write failed: {}", err))
}

/// Cell text for one field, in a form the importer reads back
pub fn cell_value(record: &MemberRecord, field: MemberField) -> String {
    let text = |value: &Option<String>| value.as_deref().map(single_line).unwrap_or_default();
    let number = |value: Option<i64>| value.map(|n| n.to_string()).unwrap_or_default();
    let flag = |value: bool| if value { "Yes" } else { "No" }.to_string();
    let date = |value: &chrono::DateTime<chrono::Utc>| value.to_rfc3339_opts(SecondsFormat::AutoSi, true);

    match field {
        MemberField::Name => single_line(&record.name),
        MemberField::Email => record.email.clone(),
        MemberField::Phone => text(&record.phone),
        MemberField::Company => text(&record.company),
        MemberField::City => text(&record.city),
        MemberField::Bio => text(&record.bio),
        MemberField::Title => text(&record.title),
        MemberField::MeetupUserId => text(&record.meetup_user_id),
        MemberField::MeetupMemberId => text(&record.meetup_member_id),
        MemberField::MeetupUrl => text(&record.meetup_url),
        MemberField::LinkedinUrl => text(&record.linkedin_url),
        MemberField::TwitterUrl => text(&record.twitter_url),
        MemberField::FacebookUrl => text(&record.facebook_url),
        MemberField::Interests => record.interests.join("; "),
        MemberField::TotalResponses => number(record.total_responses),
        MemberField::RespondedYes => number(record.responded_yes),
        MemberField::RespondedMaybe => number(record.responded_maybe),
        MemberField::RespondedNo => number(record.responded_no),
        MemberField::MeetupsAttended => number(record.meetups_attended),
        MemberField::Absences => number(record.absences),
        MemberField::HasPhoto => flag(record.has_photo),
        MemberField::IsAssistantOrganizer => flag(record.is_assistant_organizer),
        MemberField::IsOnMailingList => flag(record.is_on_mailing_list),
        MemberField::JoinDate => date(&record.join_date),
        MemberField::LastActive => date(&record.last_active),
        MemberField::LastAttended => record.last_attended.as_ref().map(date).unwrap_or_default(),
    }
}

/// The importer reads one row per line
fn single_line(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}
