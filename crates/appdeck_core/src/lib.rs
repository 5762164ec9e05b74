//! Core domain logic for AppDeck.
//! This crate is the single source of truth for catalog invariants.

pub mod db;
pub mod exchange;
pub mod logging;
pub mod model;
pub mod platform;
pub mod repo;
pub mod service;
pub mod watch;
pub mod worker;

pub use exchange::config::{
    export_configuration, import_configuration, ExchangeError, ExchangePhase, ExchangeTracker,
    ImportOutcome,
};
pub use exchange::document::{ConfigApp, ConfigDocument, ConfigFolder};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::app::{AppEntry, InstalledApp};
pub use model::folder::{Folder, FolderId};
pub use model::ValidationError;
pub use platform::{present_apps, IconSource, InstalledAppSource, PlatformError, PresentedApp};
pub use repo::app_repo::{AppRepository, RepoError, RepoResult, SqliteAppRepository};
pub use repo::folder_repo::{FolderRepository, SqliteFolderRepository};
pub use service::assignment_service::AssignmentService;
pub use service::folder_service::{FolderService, FolderServiceError};
pub use service::reconcile_service::{ReconcileError, ReconcileOutcome, ReconcileService};
pub use watch::{CatalogHub, CatalogSnapshot, SubscriptionId};
pub use worker::{CatalogWorker, WorkerError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
