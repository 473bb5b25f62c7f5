//! HTTP API handlers for meetup-mi

pub mod health;
pub mod import;
pub mod layout;
pub mod members;

pub use health::health_routes;
pub use import::{download_template, import_members, import_routes};
pub use members::{delete_member, export_members, get_member, list_members, member_routes};
