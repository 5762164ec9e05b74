//! Portable configuration document shape.
//!
//! UTF-8 JSON with two top-level arrays. Folder membership is recorded by
//! folder *name* because internal folder ids are not stable across
//! reinstalls or re-imports.

use serde::{Deserialize, Serialize};

/// Serialized catalog snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigDocument {
    pub folders: Vec<ConfigFolder>,
    pub apps: Vec<ConfigApp>,
}

/// One folder in the document, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFolder {
    pub name: String,
    pub order: i64,
}

/// One application in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigApp {
    pub package_name: String,
    pub app_name: String,
    /// `None`/`null` means uncategorized.
    #[serde(default)]
    pub folder_name: Option<String>,
}
