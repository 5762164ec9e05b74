//! Application catalog records.
//!
//! # Responsibility
//! - Define the stored application row and the platform enumeration shape.
//!
//! # Invariants
//! - `package_name` is the stable primary key; it never changes for an
//!   installed application.
//! - `folder_id = None` means uncategorized.
//! - Application existence is derived from the platform installed-app list;
//!   folder assignment is owned by this catalog.

use crate::model::folder::FolderId;
use crate::model::ValidationError;

/// Stored application row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppEntry {
    /// Stable package identifier, primary key.
    pub package_name: String,
    /// User-facing label as reported by the platform at reconcile time.
    pub app_name: String,
    /// Owning folder, `None` when uncategorized.
    pub folder_id: Option<FolderId>,
}

impl AppEntry {
    /// Creates an uncategorized entry, the shape the reconciler inserts.
    pub fn new(package_name: impl Into<String>, app_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            app_name: app_name.into(),
            folder_id: None,
        }
    }

    /// Returns a copy of this entry assigned to the given folder.
    pub fn assigned_to(&self, folder_id: Option<FolderId>) -> Self {
        Self {
            folder_id,
            ..self.clone()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.package_name.trim().is_empty() {
            return Err(ValidationError::BlankPackageName);
        }
        Ok(())
    }
}

/// One launchable application as enumerated by the platform.
///
/// The platform may report several launchable activities per package; the
/// reconciler collapses them to one entry per `package_name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledApp {
    pub package_name: String,
    pub app_name: String,
}

impl InstalledApp {
    pub fn new(package_name: impl Into<String>, app_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            app_name: app_name.into(),
        }
    }
}
