//! Application-to-folder assignment service.
//!
//! The single mutation point for the app-to-folder relationship. Callers
//! are responsible for supplying `None` or a currently-valid folder id;
//! this service performs no folder lookup of its own.

use crate::model::app::AppEntry;
use crate::model::folder::FolderId;
use crate::repo::app_repo::{AppRepository, RepoError, RepoResult};

/// Use-case service moving applications into and out of folders.
pub struct AssignmentService<R: AppRepository> {
    repo: R,
}

impl<R: AppRepository> AssignmentService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Replaces the stored row for `app.package_name` with the given
    /// assignment; `None` uncategorizes.
    ///
    /// A package that was uninstalled (and pruned) since the caller read it
    /// is a silent no-op.
    pub fn assign_app_to_folder(
        &self,
        app: &AppEntry,
        folder_id: Option<FolderId>,
    ) -> RepoResult<()> {
        match self.repo.update_app(&app.assigned_to(folder_id)) {
            Ok(()) => Ok(()),
            Err(RepoError::AppNotFound(_)) => Ok(()),
            Err(other) => Err(other),
        }
    }
}
