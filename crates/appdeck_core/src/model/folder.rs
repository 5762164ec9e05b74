//! Folder domain model.
//!
//! # Invariants
//! - `id` is stable for the lifetime of the folder and never reused.
//! - `name` is non-empty but not required to be unique.
//! - `sort_order` defines display order; values need not be contiguous.

use crate::model::ValidationError;
use uuid::Uuid;

/// Stable identifier for a user-defined folder.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type FolderId = Uuid;

/// User-defined application group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    pub id: FolderId,
    pub name: String,
    pub sort_order: i64,
}

impl Folder {
    /// Creates a folder with a generated stable id.
    pub fn new(name: impl Into<String>, sort_order: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            sort_order,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::BlankFolderName);
        }
        Ok(())
    }
}
