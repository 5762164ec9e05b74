//! Folder management use-case service.
//!
//! # Responsibility
//! - Validate folder names above the repository layer.
//! - Provide create, rename, delete, and reorder operations.
//!
//! # Invariants
//! - Blank names are rejected before any store mutation.
//! - Operations targeting a stale folder id are silent no-ops; concurrent
//!   deletion is an expected condition, not a failure.

use crate::model::folder::{Folder, FolderId};
use crate::repo::app_repo::RepoError;
use crate::repo::folder_repo::FolderRepository;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from folder service operations.
#[derive(Debug)]
pub enum FolderServiceError {
    /// Folder name is blank after trimming.
    InvalidName,
    /// Repository-level failure.
    Repo(RepoError),
}

impl Display for FolderServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName => write!(f, "folder name must not be blank"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for FolderServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::InvalidName => None,
        }
    }
}

impl From<RepoError> for FolderServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Use-case service for folder CRUD and ordering.
pub struct FolderService<R: FolderRepository> {
    repo: R,
}

impl<R: FolderRepository> FolderService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a folder at the end of the current ordering.
    ///
    /// # Contract
    /// - Blank `name` (after trim) fails with `InvalidName`; nothing is
    ///   stored.
    /// - Returns the created folder with its generated id.
    pub fn create_folder(&self, name: impl Into<String>) -> Result<Folder, FolderServiceError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(FolderServiceError::InvalidName);
        }
        Ok(self.repo.create_folder(trimmed)?)
    }

    /// Renames one folder, preserving its sort order.
    ///
    /// Returns `Ok(None)` when the folder no longer exists.
    pub fn rename_folder(
        &self,
        id: FolderId,
        new_name: impl Into<String>,
    ) -> Result<Option<Folder>, FolderServiceError> {
        let Some(mut folder) = self.repo.get_folder(id)? else {
            return Ok(None);
        };

        let new_name = new_name.into();
        let trimmed = new_name.trim();
        if trimmed.is_empty() {
            return Err(FolderServiceError::InvalidName);
        }

        folder.name = trimmed.to_string();
        match self.repo.update_folder(&folder) {
            Ok(()) => Ok(Some(folder)),
            // Deleted between lookup and update; same stale-id no-op.
            Err(RepoError::FolderNotFound(_)) => Ok(None),
            Err(other) => Err(other.into()),
        }
    }

    /// Deletes one folder and uncategorizes its applications.
    ///
    /// Returns whether a folder was actually removed.
    pub fn delete_folder(&self, id: FolderId) -> Result<bool, FolderServiceError> {
        match self.repo.delete_cascade(id) {
            Ok(()) => Ok(true),
            Err(RepoError::FolderNotFound(_)) => Ok(false),
            Err(other) => Err(other.into()),
        }
    }

    /// Persists a full permutation of all folders as the new display order.
    ///
    /// # Contract
    /// - `ids` must contain every folder exactly once; partial lists are
    ///   out of contract.
    /// - Position in `ids` becomes the folder's `sort_order`.
    pub fn reorder_folders(&self, ids: &[FolderId]) -> Result<(), FolderServiceError> {
        Ok(self.repo.reorder(ids)?)
    }

    /// Lists folders in display order.
    pub fn list_folders(&self) -> Result<Vec<Folder>, FolderServiceError> {
        Ok(self.repo.list_folders()?)
    }
}
