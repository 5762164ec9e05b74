//! FFI use-case API for the UI runtime.
//!
//! # Responsibility
//! - Expose stable, use-case-level catalog functions via FRB.
//! - Keep error semantics simple for the presentation layer: envelope
//!   responses carry `ok` + `message`, never panics across the boundary.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - The catalog DB path is resolved once per process.

use appdeck_core::db::open_db;
use appdeck_core::{
    core_version as core_version_inner, export_configuration, import_configuration,
    init_logging as init_logging_inner, ping as ping_inner, AppEntry, AppRepository,
    AssignmentService, FolderService, InstalledApp, ReconcileService, SqliteAppRepository,
    SqliteFolderRepository,
};
use log::warn;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::OnceLock;
use uuid::Uuid;

const CATALOG_DB_FILE_NAME: &str = "appdeck_catalog.sqlite3";
static CATALOG_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on
///   failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether the operation succeeded.
    pub ok: bool,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!("event=ffi_action module=ffi status=error message={message}");
        Self { ok: false, message }
    }
}

/// Action response carrying the created/affected folder id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderActionResponse {
    pub ok: bool,
    /// Stable folder id in string form, when one applies.
    pub folder_id: Option<String>,
    pub message: String,
}

/// One folder row for list rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderDto {
    pub folder_id: String,
    pub name: String,
    pub sort_order: i64,
}

/// One application row for list rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDto {
    pub package_name: String,
    pub app_name: String,
    /// Owning folder id, `None` when uncategorized.
    pub folder_id: Option<String>,
}

/// Folder listing envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderListResponse {
    pub ok: bool,
    pub folders: Vec<FolderDto>,
    pub message: String,
}

/// Application listing envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppListResponse {
    pub ok: bool,
    pub apps: Vec<AppDto>,
    pub message: String,
}

/// One installed application as enumerated by the host platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledAppDto {
    pub package_name: String,
    pub app_name: String,
}

/// Reconcile result envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileResponse {
    pub ok: bool,
    pub added: u32,
    pub removed: u32,
    pub message: String,
}

/// Export result envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResponse {
    pub ok: bool,
    /// Serialized configuration document on success.
    pub document: Option<String>,
    /// Timestamped file name the UI may offer as a default.
    pub suggested_file_name: Option<String>,
    pub message: String,
}

/// Merges the host's installed-app enumeration into the catalog.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics; duplicates per package are collapsed, first entry wins.
#[flutter_rust_bridge::frb(sync)]
pub fn reconcile_installed(apps: Vec<InstalledAppDto>) -> ReconcileResponse {
    let installed: Vec<InstalledApp> = apps
        .into_iter()
        .map(|app| InstalledApp::new(app.package_name, app.app_name))
        .collect();

    let outcome = with_conn(|conn| {
        let service = ReconcileService::new(repo_apps(conn)?);
        service
            .reconcile(&installed)
            .map_err(|err| format!("reconcile failed: {err}"))
    });

    match outcome {
        Ok(outcome) => ReconcileResponse {
            ok: true,
            added: outcome.added as u32,
            removed: outcome.removed as u32,
            message: format!(
                "Catalog reconciled: {} added, {} removed.",
                outcome.added, outcome.removed
            ),
        },
        Err(message) => ReconcileResponse {
            ok: false,
            added: 0,
            removed: 0,
            message,
        },
    }
}

/// Creates one folder at the end of the current ordering.
#[flutter_rust_bridge::frb(sync)]
pub fn create_folder(name: String) -> FolderActionResponse {
    let created = with_conn(|conn| {
        let service = FolderService::new(repo_folders(conn)?);
        service
            .create_folder(name.as_str())
            .map_err(|err| format!("create_folder failed: {err}"))
    });

    match created {
        Ok(folder) => FolderActionResponse {
            ok: true,
            folder_id: Some(folder.id.to_string()),
            message: "Folder created.".to_string(),
        },
        Err(message) => FolderActionResponse {
            ok: false,
            folder_id: None,
            message,
        },
    }
}

/// Renames one folder, preserving its display order.
#[flutter_rust_bridge::frb(sync)]
pub fn rename_folder(folder_id: String, new_name: String) -> ActionResponse {
    let id = match parse_folder_id(&folder_id) {
        Ok(id) => id,
        Err(message) => return ActionResponse::failure(message),
    };

    let renamed = with_conn(|conn| {
        let service = FolderService::new(repo_folders(conn)?);
        service
            .rename_folder(id, new_name.as_str())
            .map_err(|err| format!("rename_folder failed: {err}"))
    });

    match renamed {
        Ok(Some(_)) => ActionResponse::success("Folder renamed."),
        Ok(None) => ActionResponse::success("Folder no longer exists; nothing renamed."),
        Err(message) => ActionResponse::failure(message),
    }
}

/// Deletes one folder; its applications become uncategorized.
#[flutter_rust_bridge::frb(sync)]
pub fn delete_folder(folder_id: String) -> ActionResponse {
    let id = match parse_folder_id(&folder_id) {
        Ok(id) => id,
        Err(message) => return ActionResponse::failure(message),
    };

    let deleted = with_conn(|conn| {
        let service = FolderService::new(repo_folders(conn)?);
        service
            .delete_folder(id)
            .map_err(|err| format!("delete_folder failed: {err}"))
    });

    match deleted {
        Ok(true) => ActionResponse::success("Folder deleted."),
        Ok(false) => ActionResponse::success("Folder no longer exists; nothing deleted."),
        Err(message) => ActionResponse::failure(message),
    }
}

/// Persists a full permutation of all folders as the new display order.
#[flutter_rust_bridge::frb(sync)]
pub fn reorder_folders(folder_ids: Vec<String>) -> ActionResponse {
    let mut ids = Vec::with_capacity(folder_ids.len());
    for raw in &folder_ids {
        match parse_folder_id(raw) {
            Ok(id) => ids.push(id),
            Err(message) => return ActionResponse::failure(message),
        }
    }

    let reordered = with_conn(|conn| {
        let service = FolderService::new(repo_folders(conn)?);
        service
            .reorder_folders(&ids)
            .map_err(|err| format!("reorder_folders failed: {err}"))
    });

    match reordered {
        Ok(()) => ActionResponse::success("Folders reordered."),
        Err(message) => ActionResponse::failure(message),
    }
}

/// Moves one application into a folder, or out of any folder.
///
/// `folder_id = None` uncategorizes. An application that was pruned since
/// the UI read it is reported as success (stale state, next snapshot
/// corrects the view).
#[flutter_rust_bridge::frb(sync)]
pub fn assign_app(package_name: String, folder_id: Option<String>) -> ActionResponse {
    let target = match folder_id {
        Some(raw) => match parse_folder_id(&raw) {
            Ok(id) => Some(id),
            Err(message) => return ActionResponse::failure(message),
        },
        None => None,
    };

    let assigned = with_conn(|conn| {
        let apps = repo_apps(conn)?;
        let stored = apps
            .get_app(package_name.as_str())
            .map_err(|err| format!("assign_app failed: {err}"))?;
        let Some(app) = stored else {
            return Ok(false);
        };

        let service = AssignmentService::new(repo_apps(conn)?);
        service
            .assign_app_to_folder(&app, target)
            .map_err(|err| format!("assign_app failed: {err}"))?;
        Ok(true)
    });

    match assigned {
        Ok(true) => ActionResponse::success("Application assigned."),
        Ok(false) => ActionResponse::success("Application not in catalog; nothing assigned."),
        Err(message) => ActionResponse::failure(message),
    }
}

/// Lists folders in display order.
#[flutter_rust_bridge::frb(sync)]
pub fn list_folders() -> FolderListResponse {
    let listed = with_conn(|conn| {
        let service = FolderService::new(repo_folders(conn)?);
        service
            .list_folders()
            .map_err(|err| format!("list_folders failed: {err}"))
    });

    match listed {
        Ok(folders) => FolderListResponse {
            ok: true,
            folders: folders
                .into_iter()
                .map(|folder| FolderDto {
                    folder_id: folder.id.to_string(),
                    name: folder.name,
                    sort_order: folder.sort_order,
                })
                .collect(),
            message: String::new(),
        },
        Err(message) => FolderListResponse {
            ok: false,
            folders: Vec::new(),
            message,
        },
    }
}

/// Lists every application in display order.
#[flutter_rust_bridge::frb(sync)]
pub fn list_apps() -> AppListResponse {
    app_list_response(|apps| apps.list_apps())
}

/// Lists applications with no folder assignment.
#[flutter_rust_bridge::frb(sync)]
pub fn list_uncategorized_apps() -> AppListResponse {
    app_list_response(|apps| apps.list_uncategorized())
}

/// Lists applications assigned to one folder.
#[flutter_rust_bridge::frb(sync)]
pub fn list_apps_in_folder(folder_id: String) -> AppListResponse {
    let id = match parse_folder_id(&folder_id) {
        Ok(id) => id,
        Err(message) => {
            return AppListResponse {
                ok: false,
                apps: Vec::new(),
                message,
            }
        }
    };
    app_list_response(move |apps| apps.list_in_folder(id))
}

/// Snapshots the catalog as a portable JSON document.
#[flutter_rust_bridge::frb(sync)]
pub fn export_config() -> ExportResponse {
    let exported = with_conn(|conn| {
        export_configuration(conn).map_err(|err| format!("export_config failed: {err}"))
    });

    match exported {
        Ok(document) => ExportResponse {
            ok: true,
            document: Some(document),
            suggested_file_name: Some(suggest_export_file_name()),
            message: "Configuration exported.".to_string(),
        },
        Err(message) => ExportResponse {
            ok: false,
            document: None,
            suggested_file_name: None,
            message,
        },
    }
}

/// Replaces the stored catalog with the document's contents.
///
/// All-or-nothing: a failed import leaves the previous catalog intact.
#[flutter_rust_bridge::frb(sync)]
pub fn import_config(document: String) -> ActionResponse {
    let imported = with_conn(|conn| {
        import_configuration(conn, document.as_str())
            .map_err(|err| format!("import_config failed: {err}"))
    });

    match imported {
        Ok(outcome) => ActionResponse::success(format!(
            "Configuration imported: {} folder(s), {} app(s).",
            outcome.folders, outcome.apps
        )),
        Err(message) => ActionResponse::failure(message),
    }
}

fn suggest_export_file_name() -> String {
    format!(
        "AppDeck_{}.json",
        chrono::Local::now().format("%Y-%m-%d_%H-%M-%S")
    )
}

fn resolve_db_path() -> PathBuf {
    CATALOG_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("APPDECK_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(CATALOG_DB_FILE_NAME)
        })
        .clone()
}

fn with_conn<T>(f: impl FnOnce(&Connection) -> Result<T, String>) -> Result<T, String> {
    let conn =
        open_db(resolve_db_path()).map_err(|err| format!("catalog DB open failed: {err}"))?;
    f(&conn)
}

fn repo_apps(conn: &Connection) -> Result<SqliteAppRepository<'_>, String> {
    SqliteAppRepository::try_new(conn).map_err(|err| format!("catalog repo init failed: {err}"))
}

fn repo_folders(conn: &Connection) -> Result<SqliteFolderRepository<'_>, String> {
    SqliteFolderRepository::try_new(conn).map_err(|err| format!("catalog repo init failed: {err}"))
}

fn parse_folder_id(raw: &str) -> Result<uuid::Uuid, String> {
    Uuid::parse_str(raw.trim()).map_err(|_| format!("invalid folder id `{raw}`"))
}

fn app_list_response(
    f: impl FnOnce(&SqliteAppRepository<'_>) -> appdeck_core::RepoResult<Vec<AppEntry>>,
) -> AppListResponse {
    let listed = with_conn(|conn| {
        let apps = repo_apps(conn)?;
        f(&apps).map_err(|err| format!("app listing failed: {err}"))
    });

    match listed {
        Ok(apps) => AppListResponse {
            ok: true,
            apps: apps
                .into_iter()
                .map(|app| AppDto {
                    package_name: app.package_name,
                    app_name: app.app_name,
                    folder_id: app.folder_id.map(|id| id.to_string()),
                })
                .collect(),
            message: String::new(),
        },
        Err(message) => AppListResponse {
            ok: false,
            apps: Vec::new(),
            message,
        },
    }
}
