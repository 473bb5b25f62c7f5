//! Header-to-field mapping
//!
//! Recognized header text (French and English Meetup exports, plus common
//! hand-made spreadsheet headings) maps to a canonical [`MemberField`].

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use tracing::debug;

use super::error::ImportError;
use super::policy::{DuplicateHeaderPolicy, IdentityField, ImportPolicy};
use super::table::normalize_header;

/// Canonical member field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MemberField {
    Name,
    Email,
    Phone,
    Company,
    City,
    Bio,
    Title,
    MeetupUserId,
    MeetupMemberId,
    MeetupUrl,
    LinkedinUrl,
    TwitterUrl,
    FacebookUrl,
    Interests,
    TotalResponses,
    RespondedYes,
    RespondedMaybe,
    RespondedNo,
    MeetupsAttended,
    Absences,
    HasPhoto,
    IsAssistantOrganizer,
    IsOnMailingList,
    JoinDate,
    LastActive,
    LastAttended,
}

impl MemberField {
    /// Every field, in `members` table column order
    pub const ALL: [MemberField; 26] = [
        MemberField::Name,
        MemberField::Email,
        MemberField::Phone,
        MemberField::Company,
        MemberField::City,
        MemberField::Bio,
        MemberField::Title,
        MemberField::MeetupUserId,
        MemberField::MeetupMemberId,
        MemberField::MeetupUrl,
        MemberField::LinkedinUrl,
        MemberField::TwitterUrl,
        MemberField::FacebookUrl,
        MemberField::Interests,
        MemberField::TotalResponses,
        MemberField::RespondedYes,
        MemberField::RespondedMaybe,
        MemberField::RespondedNo,
        MemberField::MeetupsAttended,
        MemberField::Absences,
        MemberField::HasPhoto,
        MemberField::IsAssistantOrganizer,
        MemberField::IsOnMailingList,
        MemberField::JoinDate,
        MemberField::LastActive,
        MemberField::LastAttended,
    ];

    /// Column name in the `members` table
    pub fn as_str(self) -> &'static str {
        match self {
            MemberField::Name => "name",
            MemberField::Email => "email",
            MemberField::Phone => "phone",
            MemberField::Company => "company",
            MemberField::City => "city",
            MemberField::Bio => "bio",
            MemberField::Title => "title",
            MemberField::MeetupUserId => "meetup_user_id",
            MemberField::MeetupMemberId => "meetup_member_id",
            MemberField::MeetupUrl => "meetup_url",
            MemberField::LinkedinUrl => "linkedin_url",
            MemberField::TwitterUrl => "twitter_url",
            MemberField::FacebookUrl => "facebook_url",
            MemberField::Interests => "interests",
            MemberField::TotalResponses => "total_responses",
            MemberField::RespondedYes => "responded_yes",
            MemberField::RespondedMaybe => "responded_maybe",
            MemberField::RespondedNo => "responded_no",
            MemberField::MeetupsAttended => "meetups_attended",
            MemberField::Absences => "absences",
            MemberField::HasPhoto => "has_photo",
            MemberField::IsAssistantOrganizer => "is_assistant_organizer",
            MemberField::IsOnMailingList => "is_on_mailing_list",
            MemberField::JoinDate => "join_date",
            MemberField::LastActive => "last_active",
            MemberField::LastAttended => "last_attended",
        }
    }

    /// English header used by the CSV template and export
    pub fn template_header(self) -> &'static str {
        match self {
            MemberField::Name => "Name",
            MemberField::Email => "Email",
            MemberField::Phone => "Phone",
            MemberField::Company => "Company",
            MemberField::City => "City",
            MemberField::Bio => "Bio",
            MemberField::Title => "Title",
            MemberField::MeetupUserId => "User ID",
            MemberField::MeetupMemberId => "Member ID",
            MemberField::MeetupUrl => "Meetup URL",
            MemberField::LinkedinUrl => "LinkedIn",
            MemberField::TwitterUrl => "Twitter",
            MemberField::FacebookUrl => "Facebook",
            MemberField::Interests => "Interests",
            MemberField::TotalResponses => "Total RSVPs",
            MemberField::RespondedYes => "RSVPed Yes",
            MemberField::RespondedMaybe => "RSVPed Maybe",
            MemberField::RespondedNo => "RSVPed No",
            MemberField::MeetupsAttended => "Meetups attended",
            MemberField::Absences => "No shows",
            MemberField::HasPhoto => "Photo",
            MemberField::IsAssistantOrganizer => "Assistant Organizer",
            MemberField::IsOnMailingList => "Mailing List",
            MemberField::JoinDate => "Join Date",
            MemberField::LastActive => "Last Active",
            MemberField::LastAttended => "Last Attended",
        }
    }

    /// Fields that may identify a member under the given policy
    pub fn identity_fields(identity: IdentityField) -> &'static [MemberField] {
        match identity {
            IdentityField::Name => &[MemberField::Name],
            IdentityField::NameOrId => &[
                MemberField::Name,
                MemberField::MeetupMemberId,
                MemberField::MeetupUserId,
            ],
        }
    }
}

impl fmt::Display for MemberField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MemberField::ALL
            .iter()
            .copied()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| format!("Unknown member field: {}", s))
    }
}

/// Built-in header synonyms per field (before normalization)
const BUILTIN_SYNONYMS: &[(MemberField, &[&str])] = &[
    (MemberField::Name, &["name", "full name", "nom", "nom complet", "member name", "membre"]),
    (MemberField::Email, &["email", "e-mail", "email address", "adresse e-mail", "adresse email", "courriel", "mail"]),
    (MemberField::Phone, &["phone", "phone number", "mobile", "téléphone", "telephone", "numéro de téléphone"]),
    (MemberField::Company, &["company", "organization", "organisation", "entreprise", "société", "societe"]),
    (MemberField::City, &["city", "location", "ville", "lieu", "localisation"]),
    (MemberField::Bio, &["bio", "intro", "introduction", "about", "présentation", "presentation"]),
    (MemberField::Title, &["title", "job title", "titre", "poste", "fonction"]),
    (MemberField::MeetupUserId, &["user id", "user-id", "userid", "id utilisateur", "identifiant utilisateur"]),
    (MemberField::MeetupMemberId, &["member id", "member-id", "memberid", "id du membre", "id membre"]),
    (MemberField::MeetupUrl, &["meetup url", "url of member profile", "profile url", "url du profil du membre", "url du profil", "profil meetup"]),
    (MemberField::LinkedinUrl, &["linkedin", "linkedin url", "linkedin profile", "profil linkedin"]),
    (MemberField::TwitterUrl, &["twitter", "twitter url", "x", "x (twitter)", "profil twitter"]),
    (MemberField::FacebookUrl, &["facebook", "facebook url", "profil facebook"]),
    (MemberField::Interests, &["interests", "topics", "centres d'intérêt", "centres d'interet", "intérêts", "interets", "sujets"]),
    (MemberField::TotalResponses, &["total rsvps", "total responses", "total des réponses", "total des reponses", "nombre de réponses"]),
    (MemberField::RespondedYes, &["rsvped yes", "responded yes", "rsvp yes", "a répondu oui", "a repondu oui", "réponses oui"]),
    (MemberField::RespondedMaybe, &["rsvped maybe", "responded maybe", "rsvp maybe", "a répondu peut-être", "a repondu peut-etre", "réponses peut-être"]),
    (MemberField::RespondedNo, &["rsvped no", "responded no", "rsvp no", "a répondu non", "a repondu non", "réponses non"]),
    (MemberField::MeetupsAttended, &["meetups attended", "events attended", "participations", "meetups auxquels le membre a participé", "événements suivis"]),
    (MemberField::Absences, &["no shows", "no-shows", "absences", "absent"]),
    (MemberField::HasPhoto, &["photo", "has photo", "a une photo"]),
    (MemberField::IsAssistantOrganizer, &["assistant organizer", "co-organizer", "co-organisateur", "organisateur adjoint"]),
    (MemberField::IsOnMailingList, &["mailing list", "on mailing list", "liste de diffusion", "newsletter"]),
    (MemberField::JoinDate, &["join date", "member since", "joined group on", "rejoindre le groupe le", "joined group", "date d'inscription", "membre depuis"]),
    (MemberField::LastActive, &["last active", "last visited group on", "last visit", "dernière visite du groupe le", "derniere visite du groupe le", "dernière activité"]),
    (MemberField::LastAttended, &["last attended", "dernière participation", "derniere participation", "dernier événement"]),
];

/// Immutable lookup from normalized header text to canonical field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynonymTable {
    entries: HashMap<String, MemberField>,
}

impl Default for SynonymTable {
    fn default() -> Self {
        let entries = BUILTIN_SYNONYMS
            .iter()
            .flat_map(|(field, headers)| {
                headers
                    .iter()
                    .map(move |header| (normalize_header(header), *field))
            })
            .collect();
        Self { entries }
    }
}

impl SynonymTable {
    /// Copy of this table with one more recognized header.
    ///
    /// The header is normalized the same way file headers are, so callers
    /// may pass it as it appears in the spreadsheet.
    pub fn with_synonym(&self, header: &str, field: MemberField) -> Self {
        let mut entries = self.entries.clone();
        entries.insert(normalize_header(header), field);
        Self { entries }
    }

    /// Field for an already-normalized header
    pub fn lookup(&self, normalized_header: &str) -> Option<MemberField> {
        self.entries.get(normalized_header).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Canonical field → zero-based column index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    columns: HashMap<MemberField, usize>,
}

impl FieldMap {
    pub fn get(&self, field: MemberField) -> Option<usize> {
        self.columns.get(&field).copied()
    }

    pub fn contains(&self, field: MemberField) -> bool {
        self.columns.contains_key(&field)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    fn insert(&mut self, field: MemberField, index: usize, duplicates: DuplicateHeaderPolicy) {
        match duplicates {
            DuplicateHeaderPolicy::LastWins => {
                self.columns.insert(field, index);
            }
            DuplicateHeaderPolicy::FirstWins => {
                self.columns.entry(field).or_insert(index);
            }
        }
    }
}

/// Build the field map for a normalized header row.
///
/// Unrecognized headers are skipped. Fails with
/// [`ImportError::MissingRequiredColumn`] when no identity column is mapped.
pub fn map_headers(
    header_row: &[String],
    synonyms: &SynonymTable,
    policy: &ImportPolicy,
) -> Result<FieldMap, ImportError> {
    let mut field_map = FieldMap::default();

    for (index, header) in header_row.iter().enumerate() {
        match synonyms.lookup(header) {
            Some(field) => field_map.insert(field, index, policy.duplicate_headers),
            None => debug!(header = %header, column = index, "Ignoring unrecognized header"),
        }
    }

    let identity = MemberField::identity_fields(policy.identity_field);
    if !identity.iter().any(|field| field_map.contains(*field)) {
        return Err(ImportError::MissingRequiredColumn {
            expected: identity.iter().map(|f| f.as_str().to_string()).collect(),
            found: header_row.to_vec(),
        });
    }

    Ok(field_map)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| normalize_header(c)).collect()
    }

    #[test]
    fn test_bilingual_join_date_synonyms() {
        let table = SynonymTable::default();
        for header in ["join date", "member since", "joined group on", "rejoindre le groupe le", "joined group"] {
            assert_eq!(table.lookup(header), Some(MemberField::JoinDate), "{}", header);
        }
    }

    #[test]
    fn test_synonyms_with_apostrophes_are_normalized() {
        let table = SynonymTable::default();
        assert_eq!(table.lookup(&normalize_header("Date d'inscription")), Some(MemberField::JoinDate));
        assert_eq!(table.lookup(&normalize_header("Centres d\u{2019}intérêt")), Some(MemberField::Interests));
    }

    #[test]
    fn test_every_template_header_maps_back() {
        let table = SynonymTable::default();
        for field in MemberField::ALL {
            assert_eq!(
                table.lookup(&normalize_header(field.template_header())),
                Some(field),
                "template header for {} does not round-trip",
                field
            );
        }
    }

    #[test]
    fn test_field_names_parse() {
        for field in MemberField::ALL {
            assert_eq!(field.as_str().parse::<MemberField>(), Ok(field));
        }
        assert!("nickname".parse::<MemberField>().is_err());
    }

    #[test]
    fn test_map_headers_skips_unknown_columns() {
        let map = map_headers(
            &headers(&["Name", "Favourite colour", "Email"]),
            &SynonymTable::default(),
            &ImportPolicy::default(),
        )
        .unwrap();
        assert_eq!(map.get(MemberField::Name), Some(0));
        assert_eq!(map.get(MemberField::Email), Some(2));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_duplicate_headers_last_wins() {
        let map = map_headers(
            &headers(&["Nom", "Bio", "Présentation"]),
            &SynonymTable::default(),
            &ImportPolicy::default(),
        )
        .unwrap();
        assert_eq!(map.get(MemberField::Bio), Some(2));
    }

    #[test]
    fn test_duplicate_headers_first_wins() {
        let policy = ImportPolicy {
            duplicate_headers: DuplicateHeaderPolicy::FirstWins,
            ..ImportPolicy::default()
        };
        let map = map_headers(&headers(&["Nom", "Bio", "Présentation"]), &SynonymTable::default(), &policy).unwrap();
        assert_eq!(map.get(MemberField::Bio), Some(1));
    }

    #[test]
    fn test_missing_name_column_is_fatal() {
        let err = map_headers(
            &headers(&["Email", "City"]),
            &SynonymTable::default(),
            &ImportPolicy::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ImportError::MissingRequiredColumn {
                expected: vec!["name".to_string()],
                found: vec!["email".to_string(), "city".to_string()],
            }
        );
    }

    #[test]
    fn test_id_column_satisfies_name_or_id_policy() {
        let policy = ImportPolicy {
            identity_field: IdentityField::NameOrId,
            ..ImportPolicy::default()
        };
        let map = map_headers(&headers(&["Member ID", "Email"]), &SynonymTable::default(), &policy).unwrap();
        assert_eq!(map.get(MemberField::MeetupMemberId), Some(0));
    }

    #[test]
    fn test_with_synonym_extends_copy() {
        let base = SynonymTable::default();
        let extended = base.with_synonym("  \"Pseudo\" ", MemberField::Name);
        assert_eq!(extended.lookup("pseudo"), Some(MemberField::Name));
        assert_eq!(base.lookup("pseudo"), None);
        assert_eq!(extended.len(), base.len() + 1);
    }
}
