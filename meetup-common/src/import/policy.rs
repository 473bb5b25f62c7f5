//! Import policy configuration
//!
//! One pipeline serves every import flavour; the differences between them are
//! expressed here instead of in separate handlers.

use serde::{Deserialize, Serialize};

/// Value stored when a numeric column is present but its cell is unparseable
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericFallback {
    /// Tolerant: store NULL
    #[default]
    Null,
    /// Strict: store 0
    Zero,
}

impl NumericFallback {
    pub fn value(self) -> Option<i64> {
        match self {
            NumericFallback::Null => None,
            NumericFallback::Zero => Some(0),
        }
    }
}

/// Which columns may identify a member
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityField {
    /// A `name` column is required and each row needs a name
    #[default]
    Name,
    /// A Meetup member/user id may stand in for a missing name
    NameOrId,
}

/// How the email column is treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailPolicy {
    /// Missing emails are synthesized from the name
    #[default]
    Synthesizable,
    /// Every row must carry a well-formed email
    Mandatory,
}

/// Resolution when two headers map to the same canonical field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateHeaderPolicy {
    #[default]
    LastWins,
    FirstWins,
}

/// Complete import policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportPolicy {
    #[serde(default)]
    pub numeric_fallback: NumericFallback,

    #[serde(default)]
    pub identity_field: IdentityField,

    #[serde(default)]
    pub email_policy: EmailPolicy,

    #[serde(default)]
    pub duplicate_headers: DuplicateHeaderPolicy,

    /// Domain used for synthesized emails
    #[serde(default = "default_placeholder_domain")]
    pub placeholder_domain: String,
}

fn default_placeholder_domain() -> String {
    "meetup-member.local".to_string()
}

impl Default for ImportPolicy {
    fn default() -> Self {
        Self {
            numeric_fallback: NumericFallback::default(),
            identity_field: IdentityField::default(),
            email_policy: EmailPolicy::default(),
            duplicate_headers: DuplicateHeaderPolicy::default(),
            placeholder_domain: default_placeholder_domain(),
        }
    }
}

impl ImportPolicy {
    /// Strict flavour: zero numeric fallback, mandatory email
    pub fn strict() -> Self {
        Self {
            numeric_fallback: NumericFallback::Zero,
            email_policy: EmailPolicy::Mandatory,
            ..Self::default()
        }
    }
}
