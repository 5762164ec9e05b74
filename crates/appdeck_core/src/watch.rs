//! Push-based catalog observation.
//!
//! # Responsibility
//! - Keep registered subscriber callbacks and fan out catalog snapshots.
//! - Suppress notifications when a write changed nothing observable.
//!
//! # Invariants
//! - Subscribers receive every published snapshot that differs from the
//!   previous one, until they unsubscribe.
//! - A new subscriber immediately receives the last published snapshot,
//!   when one exists.
//! - Callbacks run on the publishing thread; they must not block.

use crate::model::app::AppEntry;
use crate::model::folder::Folder;
use crate::repo::app_repo::{AppRepository, RepoResult, SqliteAppRepository};
use crate::repo::folder_repo::{FolderRepository, SqliteFolderRepository};
use rusqlite::Connection;
use std::sync::Mutex;

/// Handle for cancelling a subscription.
pub type SubscriptionId = u64;

/// Full observable catalog state at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatalogSnapshot {
    /// Folders in display order.
    pub folders: Vec<Folder>,
    /// All applications in display order.
    pub apps: Vec<AppEntry>,
}

/// Reads the current snapshot from a catalog connection.
pub fn load_snapshot(conn: &Connection) -> RepoResult<CatalogSnapshot> {
    let folders = SqliteFolderRepository::try_new(conn)?.list_folders()?;
    let apps = SqliteAppRepository::try_new(conn)?.list_apps()?;
    Ok(CatalogSnapshot { folders, apps })
}

type Callback = Box<dyn Fn(&CatalogSnapshot) + Send>;

struct HubState {
    next_id: SubscriptionId,
    subscribers: Vec<(SubscriptionId, Callback)>,
    last: Option<CatalogSnapshot>,
}

/// Subscriber registry with compare-before-notify publishing.
pub struct CatalogHub {
    state: Mutex<HubState>,
}

impl CatalogHub {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(HubState {
                next_id: 0,
                subscribers: Vec::new(),
                last: None,
            }),
        }
    }

    /// Registers a callback; replays the last snapshot when one exists.
    pub fn subscribe(&self, callback: impl Fn(&CatalogSnapshot) + Send + 'static) -> SubscriptionId {
        let mut state = self.lock_state();
        let id = state.next_id;
        state.next_id += 1;
        if let Some(snapshot) = &state.last {
            callback(snapshot);
        }
        state.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Removes a subscription; returns whether it was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut state = self.lock_state();
        let before = state.subscribers.len();
        state.subscribers.retain(|(existing, _)| *existing != id);
        state.subscribers.len() != before
    }

    /// Publishes a snapshot; subscribers are only notified when it differs
    /// from the previously published one. Returns whether anyone was
    /// notified.
    pub fn publish(&self, snapshot: CatalogSnapshot) -> bool {
        let mut state = self.lock_state();
        if state.last.as_ref() == Some(&snapshot) {
            return false;
        }
        for (_, callback) in &state.subscribers {
            callback(&snapshot);
        }
        let notified = !state.subscribers.is_empty();
        state.last = Some(snapshot);
        notified
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock_state().subscribers.len()
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, HubState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for CatalogHub {
    fn default() -> Self {
        Self::new()
    }
}
