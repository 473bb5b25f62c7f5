//! SQLite member store

pub mod init;
pub mod members;

pub use init::*;
pub use crate::models::PersistMode;
pub use members::StoredMember;
