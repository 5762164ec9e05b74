//! Installed-application reconciliation service.
//!
//! # Responsibility
//! - Merge the platform's installed-app list into the stored catalog.
//! - Prune rows for applications that are no longer installed.
//!
//! # Invariants
//! - Enumeration input is deduplicated by package name, first occurrence
//!   wins, before any write.
//! - Existing rows keep their folder assignment (insert-or-ignore).
//! - Reconciling the same installed set twice is a no-op the second time.

use crate::model::app::{AppEntry, InstalledApp};
use crate::platform::{InstalledAppSource, PlatformError};
use crate::repo::app_repo::{AppRepository, RepoError, RepoResult};
use log::info;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Row counts from one reconcile pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconcileOutcome {
    /// Applications newly added to the catalog (uncategorized).
    pub added: usize,
    /// Applications removed because they are no longer installed.
    pub removed: usize,
}

/// Errors from reconcile runs that pull from the platform source.
#[derive(Debug)]
pub enum ReconcileError {
    Platform(PlatformError),
    Repo(RepoError),
}

impl Display for ReconcileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Platform(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ReconcileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Platform(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<PlatformError> for ReconcileError {
    fn from(value: PlatformError) -> Self {
        Self::Platform(value)
    }
}

impl From<RepoError> for ReconcileError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Use-case service merging installed-app enumerations into the catalog.
pub struct ReconcileService<R: AppRepository> {
    repo: R,
}

impl<R: AppRepository> ReconcileService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Merges one installed-app enumeration into the catalog.
    ///
    /// # Contract
    /// - Adds unseen packages as uncategorized entries.
    /// - Never touches the folder assignment of packages already stored.
    /// - Deletes stored packages absent from `installed`.
    pub fn reconcile(&self, installed: &[InstalledApp]) -> RepoResult<ReconcileOutcome> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut batch = Vec::new();
        for app in installed {
            if seen.insert(app.package_name.as_str()) {
                batch.push(AppEntry::new(
                    app.package_name.as_str(),
                    app.app_name.as_str(),
                ));
            }
        }

        let added = self.repo.upsert_apps(&batch)?;

        let mut removed = 0;
        for package_name in self.repo.list_package_names()? {
            if !seen.contains(package_name.as_str())
                && self.repo.delete_by_package(&package_name)?
            {
                removed += 1;
            }
        }

        info!(
            "event=reconcile module=service status=ok installed={} added={} removed={}",
            seen.len(),
            added,
            removed
        );

        Ok(ReconcileOutcome { added, removed })
    }

    /// Pulls the installed-app list from the platform source and reconciles.
    pub fn reconcile_from(
        &self,
        source: &dyn InstalledAppSource,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let installed = source.enumerate_launchable_apps()?;
        Ok(self.reconcile(&installed)?)
    }
}
