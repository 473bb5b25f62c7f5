//! Database initialization
//!
//! Opens (or creates) the SQLite file and creates the `members` table on
//! first run. Table creation is idempotent.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL lets list/export reads proceed while an import transaction writes
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_members_table(&pool).await?;

    Ok(pool)
}

/// Single-connection in-memory database with the schema applied
///
/// Every connection to `sqlite::memory:` sees its own database, so the pool
/// is capped at one connection.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    create_members_table(&pool).await?;
    Ok(pool)
}

/// Create the members table
///
/// Columns are the `MemberRecord` fields plus system-managed `id`,
/// `created_at` and `updated_at`. `interests` holds a JSON array, dates hold
/// RFC 3339 text.
pub async fn create_members_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS members (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            phone TEXT,
            company TEXT,
            city TEXT,
            bio TEXT,
            title TEXT,
            meetup_user_id TEXT,
            meetup_member_id TEXT,
            meetup_url TEXT,
            linkedin_url TEXT,
            twitter_url TEXT,
            facebook_url TEXT,
            interests TEXT NOT NULL DEFAULT '[]',
            total_responses INTEGER,
            responded_yes INTEGER,
            responded_maybe INTEGER,
            responded_no INTEGER,
            meetups_attended INTEGER,
            absences INTEGER,
            has_photo INTEGER NOT NULL DEFAULT 0,
            is_assistant_organizer INTEGER NOT NULL DEFAULT 0,
            is_on_mailing_list INTEGER NOT NULL DEFAULT 0,
            join_date TEXT NOT NULL,
            last_active TEXT NOT NULL,
            last_attended TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_members_name ON members(name)")
        .execute(pool)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_members_table_is_idempotent() {
        let pool = init_memory_database().await.unwrap();
        create_members_table(&pool).await.unwrap();

        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'members'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(count, 1);
    }
}
