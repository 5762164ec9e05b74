//! Folder repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide persistence APIs for user-defined folders and their ordering.
//! - Own the cascade that keeps application rows free of dangling folder
//!   references.
//!
//! # Invariants
//! - Folder listing is deterministic: `sort_order ASC, folder_uuid ASC`.
//! - `delete_cascade` clears `apps.folder_uuid` and removes the folder row
//!   inside one immediate transaction.
//! - New folders receive `sort_order = COALESCE(MAX(sort_order), -1) + 1`.

use crate::model::folder::{Folder, FolderId};
use crate::repo::app_repo::{RepoError, RepoResult};
use crate::repo::ensure_catalog_ready;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const FOLDER_SELECT_SQL: &str = "SELECT
    folder_uuid,
    name,
    sort_order
FROM folders";

/// Repository interface for folder rows.
pub trait FolderRepository {
    /// Inserts a folder at the end of the current ordering.
    fn create_folder(&self, name: &str) -> RepoResult<Folder>;
    /// Inserts a folder with an explicit sort order. Import path.
    fn insert_with_order(&self, name: &str, sort_order: i64) -> RepoResult<Folder>;
    /// Loads one folder by id.
    fn get_folder(&self, id: FolderId) -> RepoResult<Option<Folder>>;
    /// Returns the first folder with the given name in listing order.
    fn find_by_name(&self, name: &str) -> RepoResult<Option<Folder>>;
    /// Lists folders ordered by `sort_order`.
    fn list_folders(&self) -> RepoResult<Vec<Folder>>;
    /// Full-row replace by id.
    fn update_folder(&self, folder: &Folder) -> RepoResult<()>;
    /// Removes the folder and uncategorizes every application assigned to
    /// it, atomically.
    fn delete_cascade(&self, id: FolderId) -> RepoResult<()>;
    /// Rewrites `sort_order = position` for the given full permutation.
    fn reorder(&self, ids: &[FolderId]) -> RepoResult<()>;
    /// Removes every folder row. Import-only; callers must clear
    /// application references first.
    fn delete_all(&self) -> RepoResult<()>;
}

/// SQLite-backed folder repository.
pub struct SqliteFolderRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFolderRepository<'conn> {
    /// Creates a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_catalog_ready(conn)?;
        Ok(Self { conn })
    }

    fn insert_row(&self, folder: &Folder) -> RepoResult<()> {
        folder.validate()?;
        self.conn.execute(
            "INSERT INTO folders (folder_uuid, name, sort_order)
             VALUES (?1, ?2, ?3);",
            params![folder.id.to_string(), folder.name.as_str(), folder.sort_order],
        )?;
        Ok(())
    }
}

impl FolderRepository for SqliteFolderRepository<'_> {
    fn create_folder(&self, name: &str) -> RepoResult<Folder> {
        let sort_order = next_sort_order(self.conn)?;
        let folder = Folder::new(name, sort_order);
        self.insert_row(&folder)?;
        Ok(folder)
    }

    fn insert_with_order(&self, name: &str, sort_order: i64) -> RepoResult<Folder> {
        let folder = Folder::new(name, sort_order);
        self.insert_row(&folder)?;
        Ok(folder)
    }

    fn get_folder(&self, id: FolderId) -> RepoResult<Option<Folder>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{FOLDER_SELECT_SQL} WHERE folder_uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_folder_row(row)?));
        }
        Ok(None)
    }

    fn find_by_name(&self, name: &str) -> RepoResult<Option<Folder>> {
        let mut stmt = self.conn.prepare(&format!(
            "{FOLDER_SELECT_SQL}
             WHERE name = ?1
             ORDER BY sort_order ASC, folder_uuid ASC
             LIMIT 1;"
        ))?;
        let mut rows = stmt.query([name])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_folder_row(row)?));
        }
        Ok(None)
    }

    fn list_folders(&self) -> RepoResult<Vec<Folder>> {
        let mut stmt = self.conn.prepare(&format!(
            "{FOLDER_SELECT_SQL} ORDER BY sort_order ASC, folder_uuid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut folders = Vec::new();
        while let Some(row) = rows.next()? {
            folders.push(parse_folder_row(row)?);
        }
        Ok(folders)
    }

    fn update_folder(&self, folder: &Folder) -> RepoResult<()> {
        folder.validate()?;

        let changed = self.conn.execute(
            "UPDATE folders
             SET
                name = ?2,
                sort_order = ?3,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE folder_uuid = ?1;",
            params![folder.id.to_string(), folder.name.as_str(), folder.sort_order],
        )?;

        if changed == 0 {
            return Err(RepoError::FolderNotFound(folder.id));
        }

        Ok(())
    }

    fn delete_cascade(&self, id: FolderId) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        // Clear references before removing the folder row so the no-orphan
        // invariant holds at every commit point.
        tx.execute(
            "UPDATE apps
             SET folder_uuid = NULL,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE folder_uuid = ?1;",
            [id.to_string()],
        )?;

        let deleted = tx.execute(
            "DELETE FROM folders WHERE folder_uuid = ?1;",
            [id.to_string()],
        )?;
        if deleted == 0 {
            return Err(RepoError::FolderNotFound(id));
        }

        tx.commit()?;
        Ok(())
    }

    fn reorder(&self, ids: &[FolderId]) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        for (position, id) in ids.iter().enumerate() {
            tx.execute(
                "UPDATE folders
                 SET sort_order = ?2,
                     updated_at = (strftime('%s', 'now') * 1000)
                 WHERE folder_uuid = ?1;",
                params![id.to_string(), position as i64],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn delete_all(&self) -> RepoResult<()> {
        self.conn.execute("DELETE FROM folders;", [])?;
        Ok(())
    }
}

fn next_sort_order(conn: &Connection) -> RepoResult<i64> {
    let next = conn.query_row(
        "SELECT COALESCE(MAX(sort_order), -1) + 1 FROM folders;",
        [],
        |row| row.get(0),
    )?;
    Ok(next)
}

fn parse_folder_row(row: &Row<'_>) -> RepoResult<Folder> {
    let uuid_text: String = row.get("folder_uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid uuid value `{uuid_text}` in folders.folder_uuid"
        ))
    })?;

    Ok(Folder {
        id,
        name: row.get("name")?,
        sort_order: row.get("sort_order")?,
    })
}
