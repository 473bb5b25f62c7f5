//! Member import normalizer
//!
//! Turns a spreadsheet export (comma- or tab-separated, French or English
//! headers) into normalized [`MemberRecord`](crate::models::MemberRecord)s
//! plus a per-row rejection list.
//!
//! Data flow: raw text → [`RawTable`] → [`FieldMap`] → per-row coercion →
//! [`ImportOutcome`](crate::models::ImportOutcome).

pub mod coerce;
pub mod dates;
pub mod error;
pub mod pipeline;
pub mod policy;
pub mod synonyms;
pub mod table;

pub use dates::parse_date;
pub use error::ImportError;
pub use pipeline::{run_import, EmailRegistry};
pub use policy::{DuplicateHeaderPolicy, EmailPolicy, IdentityField, ImportPolicy, NumericFallback};
pub use synonyms::{map_headers, FieldMap, MemberField, SynonymTable};
pub use table::{normalize_header, split_row, Delimiter, RawTable};
