//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for the catalog.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repositories are only constructed over migrated connections
//!   (`try_new` verifies schema version, tables, and columns).
//! - Repository APIs return semantic errors (`AppNotFound`,
//!   `FolderNotFound`) in addition to DB transport errors.

use crate::db::migrations::latest_version;
use rusqlite::Connection;

pub mod app_repo;
pub mod folder_repo;

use app_repo::{RepoError, RepoResult};

const REQUIRED_TABLES: &[(&str, &[&str])] = &[
    ("apps", &["package_name", "app_name", "folder_uuid"]),
    ("folders", &["folder_uuid", "name", "sort_order"]),
];

/// Verifies the connection is migrated and carries the catalog schema.
pub(crate) fn ensure_catalog_ready(conn: &Connection) -> RepoResult<()> {
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let expected_version = latest_version();
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for (table, columns) in REQUIRED_TABLES.iter().copied() {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for column in columns.iter().copied() {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get("name")?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}
