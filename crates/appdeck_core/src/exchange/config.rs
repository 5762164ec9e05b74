//! Export/import execution over a catalog connection.
//!
//! # Responsibility
//! - Build a [`ConfigDocument`] from the stored catalog and encode it.
//! - Rebuild the catalog from a document, remapping folder names to newly
//!   generated ids.
//!
//! # Invariants
//! - Export never mutates the catalog.
//! - Import is all-or-nothing: parse or storage failure rolls back to the
//!   pre-import state.
//! - Duplicate folder names in a document import as distinct folders; app
//!   references resolve to the last entry with that name.

use crate::exchange::document::{ConfigApp, ConfigDocument, ConfigFolder};
use crate::model::app::AppEntry;
use crate::model::folder::FolderId;
use crate::repo::app_repo::{AppRepository, RepoError, SqliteAppRepository};
use crate::repo::folder_repo::{FolderRepository, SqliteFolderRepository};
use log::{error, info};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from configuration export/import.
#[derive(Debug)]
pub enum ExchangeError {
    /// Document text is not a valid configuration document.
    Parse(serde_json::Error),
    /// Catalog snapshot could not be encoded.
    Encode(serde_json::Error),
    /// Storage failure while reading or rebuilding the catalog.
    Repo(RepoError),
}

impl Display for ExchangeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "configuration document is invalid: {err}"),
            Self::Encode(err) => write!(f, "configuration encoding failed: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ExchangeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) | Self::Encode(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for ExchangeError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<rusqlite::Error> for ExchangeError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(RepoError::from(value))
    }
}

/// Row counts from one successful import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportOutcome {
    pub folders: usize,
    pub apps: usize,
}

/// Builds the document describing the current catalog.
pub fn build_document(conn: &Connection) -> Result<ConfigDocument, ExchangeError> {
    let folder_repo = SqliteFolderRepository::try_new(conn)?;
    let app_repo = SqliteAppRepository::try_new(conn)?;

    let folders = folder_repo.list_folders()?;
    let name_by_id: HashMap<FolderId, &str> = folders
        .iter()
        .map(|folder| (folder.id, folder.name.as_str()))
        .collect();

    let apps = app_repo
        .list_apps()?
        .into_iter()
        .map(|app| ConfigApp {
            folder_name: app
                .folder_id
                .and_then(|id| name_by_id.get(&id))
                .map(|name| (*name).to_string()),
            package_name: app.package_name,
            app_name: app.app_name,
        })
        .collect();

    Ok(ConfigDocument {
        folders: folders
            .into_iter()
            .map(|folder| ConfigFolder {
                name: folder.name,
                order: folder.sort_order,
            })
            .collect(),
        apps,
    })
}

/// Snapshots the catalog as UTF-8 JSON. Never mutates stored state.
pub fn export_configuration(conn: &Connection) -> Result<String, ExchangeError> {
    let document = build_document(conn)?;
    let encoded = serde_json::to_string_pretty(&document).map_err(ExchangeError::Encode)?;
    info!(
        "event=config_export module=exchange status=ok folders={} apps={}",
        document.folders.len(),
        document.apps.len()
    );
    Ok(encoded)
}

/// Replaces the stored catalog with the document's contents.
///
/// Runs inside one immediate transaction: any parse or storage failure
/// leaves the previous catalog intact.
pub fn import_configuration(conn: &Connection, text: &str) -> Result<ImportOutcome, ExchangeError> {
    let document: ConfigDocument = match serde_json::from_str(text) {
        Ok(document) => document,
        Err(err) => {
            error!("event=config_import module=exchange status=error error_code=parse_failed error={err}");
            return Err(ExchangeError::Parse(err));
        }
    };

    match replace_catalog(conn, &document) {
        Ok(outcome) => {
            info!(
                "event=config_import module=exchange status=ok folders={} apps={}",
                outcome.folders, outcome.apps
            );
            Ok(outcome)
        }
        Err(err) => {
            error!("event=config_import module=exchange status=error error_code=store_failed error={err}");
            Err(err)
        }
    }
}

fn replace_catalog(
    conn: &Connection,
    document: &ConfigDocument,
) -> Result<ImportOutcome, ExchangeError> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;

    let app_repo = SqliteAppRepository::try_new(conn)?;
    let folder_repo = SqliteFolderRepository::try_new(conn)?;

    // Apps first: their folder references must be gone before folder rows.
    app_repo.delete_all()?;
    folder_repo.delete_all()?;

    // Duplicate names stay distinct folders; the mapping keeps the last
    // entry per name for app resolution.
    let mut id_by_name: HashMap<&str, FolderId> = HashMap::new();
    for entry in &document.folders {
        let folder = folder_repo.insert_with_order(entry.name.as_str(), entry.order)?;
        id_by_name.insert(entry.name.as_str(), folder.id);
    }

    let batch: Vec<AppEntry> = document
        .apps
        .iter()
        .map(|entry| AppEntry {
            package_name: entry.package_name.clone(),
            app_name: entry.app_name.clone(),
            folder_id: entry
                .folder_name
                .as_deref()
                .and_then(|name| id_by_name.get(name))
                .copied(),
        })
        .collect();
    let inserted = app_repo.upsert_apps(&batch)?;

    tx.commit()?;

    Ok(ImportOutcome {
        folders: document.folders.len(),
        apps: inserted,
    })
}

/// UI-visible lifecycle of one export/import invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExchangePhase {
    #[default]
    Idle,
    InProgress,
    Succeeded,
    Failed,
}

/// Single-shot progress tracker; a new `begin` starts a fresh cycle.
#[derive(Debug, Default)]
pub struct ExchangeTracker {
    phase: ExchangePhase,
}

impl ExchangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> ExchangePhase {
        self.phase
    }

    /// Starts a new in-progress cycle from any phase.
    pub fn begin(&mut self) {
        self.phase = ExchangePhase::InProgress;
    }

    /// Records the terminal outcome. Ignored unless a cycle is in progress.
    pub fn finish(&mut self, success: bool) {
        if self.phase == ExchangePhase::InProgress {
            self.phase = if success {
                ExchangePhase::Succeeded
            } else {
                ExchangePhase::Failed
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ExchangePhase, ExchangeTracker};

    #[test]
    fn tracker_walks_idle_in_progress_terminal() {
        let mut tracker = ExchangeTracker::new();
        assert_eq!(tracker.phase(), ExchangePhase::Idle);

        tracker.begin();
        assert_eq!(tracker.phase(), ExchangePhase::InProgress);

        tracker.finish(true);
        assert_eq!(tracker.phase(), ExchangePhase::Succeeded);
    }

    #[test]
    fn tracker_restarts_after_failure() {
        let mut tracker = ExchangeTracker::new();
        tracker.begin();
        tracker.finish(false);
        assert_eq!(tracker.phase(), ExchangePhase::Failed);

        tracker.begin();
        assert_eq!(tracker.phase(), ExchangePhase::InProgress);
    }

    #[test]
    fn tracker_ignores_finish_outside_cycle() {
        let mut tracker = ExchangeTracker::new();
        tracker.finish(true);
        assert_eq!(tracker.phase(), ExchangePhase::Idle);
    }
}
