//! Row orchestration: header mapping, per-row coercion, validation and
//! intra-batch email uniqueness.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::coerce;
use super::dates::parse_date;
use super::error::ImportError;
use super::policy::{EmailPolicy, IdentityField, ImportPolicy};
use super::synonyms::{map_headers, FieldMap, MemberField, SynonymTable};
use super::table::RawTable;
use crate::models::{ImportOutcome, MemberRecord, RowRejection};

/// Offset from a zero-based data row index to its reported row number
/// (header is row 1)
const ROW_NUMBER_OFFSET: usize = 2;

/// Import one uploaded file.
///
/// Returns every accepted record and every rejected row in input order.
/// Fails only when the file has no data, no identity column, or no row
/// survives validation.
pub fn run_import(
    text: &str,
    synonyms: &SynonymTable,
    policy: &ImportPolicy,
) -> Result<ImportOutcome, ImportError> {
    run_import_at(text, synonyms, policy, crate::time::now())
}

/// [`run_import`] with an explicit "now" for defaulted dates
pub fn run_import_at(
    text: &str,
    synonyms: &SynonymTable,
    policy: &ImportPolicy,
    now: DateTime<Utc>,
) -> Result<ImportOutcome, ImportError> {
    let table = RawTable::parse(text)?;
    let field_map = map_headers(&table.header_row, synonyms, policy)?;

    debug!(
        delimiter = ?table.delimiter,
        mapped_columns = field_map.len(),
        data_rows = table.data_rows.len(),
        "Parsed import header"
    );

    let mut outcome = ImportOutcome::default();
    let mut emails = EmailRegistry::default();

    for (index, cells) in table.data_rows.iter().enumerate() {
        let row_number = index + ROW_NUMBER_OFFSET;
        let row = Row {
            cells,
            fields: &field_map,
        };

        match build_record(&row, policy, &mut emails, now) {
            Ok(record) => outcome.accepted.push(record),
            Err(reason) => {
                debug!(row = row_number, reason = %reason, "Rejected import row");
                outcome.rejected.push(RowRejection::new(row_number, reason));
            }
        }
    }

    info!(
        accepted = outcome.accepted.len(),
        rejected = outcome.rejected.len(),
        "Member import normalized"
    );

    if outcome.accepted.is_empty() {
        return Err(ImportError::NoValidRecords {
            rejected: outcome.rejected,
        });
    }

    Ok(outcome)
}

/// Emails already handed out in this batch
#[derive(Debug, Default)]
pub struct EmailRegistry {
    taken: HashSet<String>,
}

impl EmailRegistry {
    /// Reserve `email`, suffixing the local part with `_1`, `_2`, … until it
    /// is unused in this batch. Returns the reserved address.
    pub fn claim(&mut self, email: &str) -> String {
        if self.taken.insert(email.to_string()) {
            return email.to_string();
        }

        let (local, domain) = match email.rfind('@') {
            Some(at) => (&email[..at], &email[at..]),
            None => (email, ""),
        };

        let mut suffix = 1;
        loop {
            let candidate = format!("{}_{}{}", local, suffix, domain);
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            suffix += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.taken.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taken.is_empty()
    }
}

/// One data row viewed through the field map
struct Row<'a> {
    cells: &'a [String],
    fields: &'a FieldMap,
}

impl<'a> Row<'a> {
    /// Cell for `field`; `None` if unmapped, `""` if the row is too short
    fn cell(&self, field: MemberField) -> Option<&'a str> {
        self.fields
            .get(field)
            .map(|index| self.cells.get(index).map(String::as_str).unwrap_or(""))
    }

    fn text(&self, field: MemberField) -> Option<String> {
        coerce::text(self.cell(field))
    }

    fn date(&self, field: MemberField) -> Option<DateTime<Utc>> {
        self.cell(field).and_then(parse_date)
    }
}

fn build_record(
    row: &Row<'_>,
    policy: &ImportPolicy,
    emails: &mut EmailRegistry,
    now: DateTime<Utc>,
) -> Result<MemberRecord, String> {
    let name = resolve_name(row, policy.identity_field).ok_or_else(|| "Missing name".to_string())?;
    let email = resolve_email(row, &name, policy)?;
    let email = emails.claim(&email);

    let numeric = |field| coerce::integer(row.cell(field), policy.numeric_fallback);

    Ok(MemberRecord {
        phone: row.text(MemberField::Phone),
        company: row.text(MemberField::Company),
        city: row.text(MemberField::City),
        bio: row.text(MemberField::Bio),
        title: row.text(MemberField::Title),
        meetup_user_id: row.text(MemberField::MeetupUserId),
        meetup_member_id: row.text(MemberField::MeetupMemberId),

        meetup_url: row.text(MemberField::MeetupUrl),
        linkedin_url: coerce::linkedin_url(row.cell(MemberField::LinkedinUrl)),
        twitter_url: row.text(MemberField::TwitterUrl),
        facebook_url: row.text(MemberField::FacebookUrl),

        interests: coerce::list(row.cell(MemberField::Interests)),

        total_responses: numeric(MemberField::TotalResponses),
        responded_yes: numeric(MemberField::RespondedYes),
        responded_maybe: numeric(MemberField::RespondedMaybe),
        responded_no: numeric(MemberField::RespondedNo),
        meetups_attended: numeric(MemberField::MeetupsAttended),
        absences: numeric(MemberField::Absences),

        has_photo: coerce::flag(row.cell(MemberField::HasPhoto)),
        is_assistant_organizer: coerce::flag(row.cell(MemberField::IsAssistantOrganizer)),
        is_on_mailing_list: coerce::flag(row.cell(MemberField::IsOnMailingList)),

        join_date: row.date(MemberField::JoinDate).unwrap_or(now),
        last_active: row.date(MemberField::LastActive).unwrap_or(now),
        last_attended: row.date(MemberField::LastAttended),

        ..MemberRecord::new(name, email, now)
    })
}

/// Row name, or `Member <id>` when the policy allows an id to stand in
fn resolve_name(row: &Row<'_>, identity: IdentityField) -> Option<String> {
    let name = row
        .cell(MemberField::Name)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string);

    match identity {
        IdentityField::Name => name,
        IdentityField::NameOrId => name.or_else(|| {
            row.text(MemberField::MeetupMemberId)
                .or_else(|| row.text(MemberField::MeetupUserId))
                .map(|id| format!("Member {}", id))
        }),
    }
}

fn resolve_email(row: &Row<'_>, name: &str, policy: &ImportPolicy) -> Result<String, String> {
    let provided = row
        .cell(MemberField::Email)
        .map(str::trim)
        .filter(|email| !email.is_empty());

    match (policy.email_policy, provided) {
        (EmailPolicy::Mandatory, None) => Err("Missing email".to_string()),
        (EmailPolicy::Mandatory, Some(email)) if !coerce::is_valid_email(email) => {
            Err(format!("Invalid email format: {}", email))
        }
        (_, Some(email)) => Ok(email.to_string()),
        (EmailPolicy::Synthesizable, None) => Ok(placeholder_email(name, &policy.placeholder_domain)),
    }
}

fn placeholder_email(name: &str, domain: &str) -> String {
    let slug = coerce::slugify_name(name);
    let local = if slug.is_empty() { "member" } else { slug.as_str() };
    format!("{}@{}", local, domain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::policy::NumericFallback;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap()
    }

    fn import(text: &str) -> Result<ImportOutcome, ImportError> {
        run_import_at(text, &SynonymTable::default(), &ImportPolicy::default(), fixed_now())
    }

    #[test]
    fn test_email_registry_suffixes() {
        let mut registry = EmailRegistry::default();
        assert_eq!(registry.claim("a@x.local"), "a@x.local");
        assert_eq!(registry.claim("a@x.local"), "a_1@x.local");
        assert_eq!(registry.claim("a@x.local"), "a_2@x.local");
        assert_eq!(registry.claim("no-at-sign"), "no-at-sign");
        assert_eq!(registry.claim("no-at-sign"), "no-at-sign_1");
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn test_email_registry_skips_taken_suffix() {
        let mut registry = EmailRegistry::default();
        registry.claim("a_1@x.local");
        registry.claim("a@x.local");
        assert_eq!(registry.claim("a@x.local"), "a_2@x.local");
    }

    #[test]
    fn test_placeholder_email_for_unsluggable_name() {
        assert_eq!(placeholder_email("李明", "meetup-member.local"), "member@meetup-member.local");
    }

    #[test]
    fn test_duplicate_names_get_distinct_emails() {
        let outcome = import("Name\nJean Dupont\nJean Dupont\n").unwrap();
        let emails: Vec<&str> = outcome.accepted.iter().map(|m| m.email.as_str()).collect();
        assert_eq!(
            emails,
            vec!["jeandupont@meetup-member.local", "jeandupont_1@meetup-member.local"]
        );
    }

    #[test]
    fn test_defaults_for_absent_columns() {
        let outcome = import("Name\nAlice\n").unwrap();
        let alice = &outcome.accepted[0];
        assert_eq!(alice.join_date, fixed_now());
        assert_eq!(alice.last_active, fixed_now());
        assert_eq!(alice.last_attended, None);
        assert_eq!(alice.total_responses, None);
        assert!(!alice.has_photo);
        assert!(alice.interests.is_empty());
    }

    #[test]
    fn test_unparseable_dates() {
        let outcome = import("Name,Join Date,Last Attended\nAlice,soon,never\n").unwrap();
        let alice = &outcome.accepted[0];
        assert_eq!(alice.join_date, fixed_now());
        assert_eq!(alice.last_attended, None);
    }

    #[test]
    fn test_ragged_row_reads_missing_cells_as_empty() {
        let policy = ImportPolicy {
            numeric_fallback: NumericFallback::Zero,
            ..ImportPolicy::default()
        };
        let outcome = run_import_at(
            "Name,City,Total RSVPs,Photo\nAlice\n",
            &SynonymTable::default(),
            &policy,
            fixed_now(),
        )
        .unwrap();
        let alice = &outcome.accepted[0];
        assert_eq!(alice.city, None);
        assert_eq!(alice.total_responses, Some(0));
        assert!(!alice.has_photo);
    }

    #[test]
    fn test_full_row_coercion() {
        let text = "Nom\tE-mail\tTéléphone\tLinkedIn\tIntérêts\tTotal des réponses\tA répondu oui\tPhoto\tCo-organisateur\tRejoindre le groupe le\tDernière participation\n\
                    Jean Dupont\tjean@example.fr\tFalse\t/in/jdupont\tRust; IA ;\t12 (est.)\tn/a\tyes\tNo\t6 juin 2023\t2024-01-20\n";
        let outcome = import(text).unwrap();
        let jean = &outcome.accepted[0];
        assert_eq!(jean.name, "Jean Dupont");
        assert_eq!(jean.email, "jean@example.fr");
        assert_eq!(jean.phone, None);
        assert_eq!(jean.linkedin_url.as_deref(), Some("https://linkedin.com/in/jdupont"));
        assert_eq!(jean.interests, vec!["Rust", "IA"]);
        assert_eq!(jean.total_responses, Some(12));
        assert_eq!(jean.responded_yes, None);
        assert!(jean.has_photo);
        assert!(!jean.is_assistant_organizer);
        assert_eq!(jean.join_date, Utc.with_ymd_and_hms(2023, 6, 6, 0, 0, 0).unwrap());
        assert_eq!(jean.last_attended, Some(Utc.with_ymd_and_hms(2024, 1, 20, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_mandatory_email_policy() {
        let policy = ImportPolicy::strict();
        let outcome = run_import_at(
            "Name,Email\nAlice,alice@example.com\nBob,\nCarol,carol-at-example\n",
            &SynonymTable::default(),
            &policy,
            fixed_now(),
        )
        .unwrap();
        assert_eq!(outcome.accepted.len(), 1);
        assert_eq!(
            outcome.messages(),
            vec![
                "Row 3: Missing email".to_string(),
                "Row 4: Invalid email format: carol-at-example".to_string(),
            ]
        );
    }

    #[test]
    fn test_synthesizable_policy_keeps_unvalidated_email() {
        let outcome = import("Name,Email\nCarol,carol-at-example\n").unwrap();
        assert_eq!(outcome.accepted[0].email, "carol-at-example");
    }

    #[test]
    fn test_name_or_id_identity() {
        let policy = ImportPolicy {
            identity_field: IdentityField::NameOrId,
            ..ImportPolicy::default()
        };
        let outcome = run_import_at(
            "Name,Member ID,User ID\n,123,\n,,u-9\n,,\nAlice,7,\n",
            &SynonymTable::default(),
            &policy,
            fixed_now(),
        )
        .unwrap();
        let names: Vec<&str> = outcome.accepted.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Member 123", "Member u-9", "Alice"]);
        assert_eq!(outcome.accepted[0].email, "member123@meetup-member.local");
        assert_eq!(outcome.messages(), vec!["Row 4: Missing name".to_string()]);
    }

    #[test]
    fn test_all_rows_rejected() {
        let err = import("Name,Email\n,a@example.com\n  ,b@example.com\n").unwrap_err();
        assert_eq!(
            err,
            ImportError::NoValidRecords {
                rejected: vec![
                    RowRejection::new(2, "Missing name"),
                    RowRejection::new(3, "Missing name"),
                ],
            }
        );
    }
}
