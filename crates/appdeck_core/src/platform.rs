//! Platform collaborator seams.
//!
//! The installed-application list and icon rendering belong to the host
//! platform; the catalog only consumes them through these traits. Hosts
//! (FFI layer, tests) provide the implementations.

use crate::model::app::{AppEntry, InstalledApp};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from platform enumeration calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The platform could not produce the installed-application list.
    Enumeration(String),
}

impl Display for PlatformError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Enumeration(message) => {
                write!(f, "installed-app enumeration failed: {message}")
            }
        }
    }
}

impl Error for PlatformError {}

/// Source of the launchable applications currently installed on the device.
pub trait InstalledAppSource {
    fn enumerate_launchable_apps(&self) -> Result<Vec<InstalledApp>, PlatformError>;
}

/// Resolves a renderable icon for a package, if it still exists.
pub trait IconSource {
    type Icon;

    /// `None` means the package is gone (uninstalled since last reconcile).
    fn resolve_icon(&self, package_name: &str) -> Option<Self::Icon>;
}

/// Catalog row paired with its resolved icon, ready for presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentedApp<T> {
    pub app: AppEntry,
    pub icon: T,
}

/// Pairs catalog rows with icons, dropping rows whose icon no longer
/// resolves. A missing icon is treated as a stale catalog row, not an
/// error; the next reconcile prunes it.
pub fn present_apps<I: IconSource>(apps: Vec<AppEntry>, icons: &I) -> Vec<PresentedApp<I::Icon>> {
    apps.into_iter()
        .filter_map(|app| {
            icons
                .resolve_icon(&app.package_name)
                .map(|icon| PresentedApp { app, icon })
        })
        .collect()
}
