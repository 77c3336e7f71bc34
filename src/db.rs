//! Database connection abstraction.
//!
//! Supports multiple backends:
//! - Local SQLite file: `path/to/db.sqlite` or `file:path` or `sqlite://path`
//! - In-memory: `:memory:`
//! - Remote Turso: `libsql://...` or `https://...` (requires TURSO_AUTH_TOKEN env var)
//!
//! Every request opens its own connection, so `:memory:` gives each request a
//! fresh, empty database. Use a file for anything that serves traffic.

use std::sync::Arc;

use libsql::{Builder, Connection, Database};

/// Shared database handle, cloned into every request.
pub type Handle = Arc<Database>;

/// Tables for users and uploaded documents.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    username     TEXT PRIMARY KEY NOT NULL,
    name         TEXT NOT NULL DEFAULT '',
    staff_member INTEGER NOT NULL DEFAULT 0,
    is_superuser INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS documents (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    title          TEXT NOT NULL,
    author         TEXT NOT NULL,
    description    TEXT NOT NULL,
    school_level   TEXT NOT NULL,
    school_subject TEXT NOT NULL,
    document       TEXT NOT NULL
);
";

/// Connect to the database.
///
/// # URL formats
/// - Local file: `mydata.db`, `file:path/to/db.sqlite`, `sqlite://path`
/// - In-memory: `:memory:`
/// - Remote Turso: `libsql://your-db.turso.io` (requires `TURSO_AUTH_TOKEN` env var)
pub async fn connect(url: &str) -> crate::Result<Handle> {
    let db = if url.starts_with("libsql://") || url.starts_with("https://") {
        // Remote Turso database
        let token = std::env::var("TURSO_AUTH_TOKEN").map_err(|_| {
            crate::Error::Config("TURSO_AUTH_TOKEN not set for remote database".into())
        })?;
        Builder::new_remote(url.to_string(), token).build().await?
    } else if url == ":memory:" {
        Builder::new_local(":memory:").build().await?
    } else {
        // Local file - strip sqlite:// or file: prefix if present
        let path = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("file:"))
            .unwrap_or(url);
        Builder::new_local(path).build().await?
    };

    Ok(Arc::new(db))
}

/// Get a connection from the database.
pub fn connection(db: &Database) -> crate::Result<Connection> {
    Ok(db.connect()?)
}

/// Create any missing tables. Safe to run on every start.
pub async fn migrate(conn: &Connection) -> crate::Result<()> {
    conn.execute_batch(SCHEMA).await?;
    tracing::debug!("Database schema is up to date");
    Ok(())
}

/// Read an integer column stored as 0/1 back into a `bool`.
pub(crate) fn flag(row: &libsql::Row, idx: i32) -> crate::Result<bool> {
    Ok(row.get::<i64>(idx)? != 0)
}
