//! Application repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over the canonical `apps` storage.
//! - Keep SQL details inside the catalog persistence boundary.
//!
//! # Invariants
//! - Write paths must call `AppEntry::validate()` before SQL mutations.
//! - Batch upserts never overwrite an existing row's folder assignment
//!   (insert-or-ignore by `package_name`).
//! - Listings are deterministic: `app_name` (case-insensitive) ascending,
//!   `package_name` as tie-break.

use crate::db::DbError;
use crate::model::app::AppEntry;
use crate::model::folder::FolderId;
use crate::model::ValidationError;
use crate::repo::ensure_catalog_ready;
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const APP_SELECT_SQL: &str = "SELECT
    package_name,
    app_name,
    folder_uuid
FROM apps";

const APP_ORDER_SQL: &str = " ORDER BY app_name COLLATE NOCASE ASC, package_name ASC";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for catalog persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    AppNotFound(String),
    FolderNotFound(FolderId),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::AppNotFound(package_name) => {
                write!(f, "application not found: {package_name}")
            }
            Self::FolderNotFound(id) => write!(f, "folder not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "catalog repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "catalog repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "catalog repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted catalog data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for application rows.
pub trait AppRepository {
    /// Inserts every entry not already present, identified by
    /// `package_name`; existing rows (and their folder assignment) are left
    /// untouched. Returns the number of newly inserted rows.
    fn upsert_apps(&self, batch: &[AppEntry]) -> RepoResult<usize>;
    /// Full-row replace by `package_name`.
    fn update_app(&self, app: &AppEntry) -> RepoResult<()>;
    /// Loads one application by package name.
    fn get_app(&self, package_name: &str) -> RepoResult<Option<AppEntry>>;
    /// Lists all applications in display order.
    fn list_apps(&self) -> RepoResult<Vec<AppEntry>>;
    /// Lists applications with no folder assignment.
    fn list_uncategorized(&self) -> RepoResult<Vec<AppEntry>>;
    /// Lists applications assigned to one folder.
    fn list_in_folder(&self, folder_id: FolderId) -> RepoResult<Vec<AppEntry>>;
    /// Lists every stored package name (reconciler prune support).
    fn list_package_names(&self) -> RepoResult<Vec<String>>;
    /// Deletes one application; returns whether a row was removed.
    fn delete_by_package(&self, package_name: &str) -> RepoResult<bool>;
    /// Removes every application row. Import-only.
    fn delete_all(&self) -> RepoResult<()>;
}

/// SQLite-backed application repository.
pub struct SqliteAppRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAppRepository<'conn> {
    /// Creates a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_catalog_ready(conn)?;
        Ok(Self { conn })
    }
}

impl AppRepository for SqliteAppRepository<'_> {
    fn upsert_apps(&self, batch: &[AppEntry]) -> RepoResult<usize> {
        let mut stmt = self.conn.prepare(
            "INSERT OR IGNORE INTO apps (package_name, app_name, folder_uuid)
             VALUES (?1, ?2, ?3);",
        )?;

        let mut inserted = 0;
        for app in batch {
            app.validate()?;
            inserted += stmt.execute(params![
                app.package_name.as_str(),
                app.app_name.as_str(),
                app.folder_id.map(|id| id.to_string()),
            ])?;
        }
        Ok(inserted)
    }

    fn update_app(&self, app: &AppEntry) -> RepoResult<()> {
        app.validate()?;

        let changed = self.conn.execute(
            "UPDATE apps
             SET
                app_name = ?2,
                folder_uuid = ?3,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE package_name = ?1;",
            params![
                app.package_name.as_str(),
                app.app_name.as_str(),
                app.folder_id.map(|id| id.to_string()),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::AppNotFound(app.package_name.clone()));
        }

        Ok(())
    }

    fn get_app(&self, package_name: &str) -> RepoResult<Option<AppEntry>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{APP_SELECT_SQL} WHERE package_name = ?1;"))?;
        let mut rows = stmt.query([package_name])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_app_row(row)?));
        }
        Ok(None)
    }

    fn list_apps(&self) -> RepoResult<Vec<AppEntry>> {
        collect_apps(self.conn, &format!("{APP_SELECT_SQL}{APP_ORDER_SQL};"), &[])
    }

    fn list_uncategorized(&self) -> RepoResult<Vec<AppEntry>> {
        collect_apps(
            self.conn,
            &format!("{APP_SELECT_SQL} WHERE folder_uuid IS NULL{APP_ORDER_SQL};"),
            &[],
        )
    }

    fn list_in_folder(&self, folder_id: FolderId) -> RepoResult<Vec<AppEntry>> {
        collect_apps(
            self.conn,
            &format!("{APP_SELECT_SQL} WHERE folder_uuid = ?1{APP_ORDER_SQL};"),
            &[&folder_id.to_string()],
        )
    }

    fn list_package_names(&self) -> RepoResult<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT package_name FROM apps;")?;
        let mut rows = stmt.query([])?;
        let mut names = Vec::new();
        while let Some(row) = rows.next()? {
            names.push(row.get(0)?);
        }
        Ok(names)
    }

    fn delete_by_package(&self, package_name: &str) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM apps WHERE package_name = ?1;", [package_name])?;
        Ok(changed > 0)
    }

    fn delete_all(&self) -> RepoResult<()> {
        self.conn.execute("DELETE FROM apps;", [])?;
        Ok(())
    }
}

fn collect_apps(
    conn: &Connection,
    sql: &str,
    bind: &[&dyn rusqlite::ToSql],
) -> RepoResult<Vec<AppEntry>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(bind)?;
    let mut apps = Vec::new();
    while let Some(row) = rows.next()? {
        apps.push(parse_app_row(row)?);
    }
    Ok(apps)
}

fn parse_app_row(row: &Row<'_>) -> RepoResult<AppEntry> {
    let folder_id = match row.get::<_, Option<String>>("folder_uuid")? {
        Some(text) => Some(Uuid::parse_str(&text).map_err(|_| {
            RepoError::InvalidData(format!("invalid uuid value `{text}` in apps.folder_uuid"))
        })?),
        None => None,
    };

    Ok(AppEntry {
        package_name: row.get("package_name")?,
        app_name: row.get("app_name")?,
        folder_id,
    })
}
