use appdeck_core::db::open_db_in_memory;
use appdeck_core::{
    present_apps, AppEntry, IconSource, InstalledApp, InstalledAppSource, PlatformError,
    ReconcileError, ReconcileService, SqliteAppRepository,
};
use std::collections::HashMap;

struct FixedAppSource {
    apps: Vec<InstalledApp>,
}

impl InstalledAppSource for FixedAppSource {
    fn enumerate_launchable_apps(&self) -> Result<Vec<InstalledApp>, PlatformError> {
        Ok(self.apps.clone())
    }
}

struct FailingAppSource;

impl InstalledAppSource for FailingAppSource {
    fn enumerate_launchable_apps(&self) -> Result<Vec<InstalledApp>, PlatformError> {
        Err(PlatformError::Enumeration("launcher unavailable".to_string()))
    }
}

/// Icon store keyed by package; anything absent renders as uninstalled.
struct StubIcons {
    icons: HashMap<String, &'static str>,
}

impl IconSource for StubIcons {
    type Icon = &'static str;

    fn resolve_icon(&self, package_name: &str) -> Option<Self::Icon> {
        self.icons.get(package_name).copied()
    }
}

#[test]
fn reconcile_from_source_merges_enumeration() {
    let conn = open_db_in_memory().unwrap();
    let service = ReconcileService::new(SqliteAppRepository::try_new(&conn).unwrap());

    let source = FixedAppSource {
        apps: vec![
            InstalledApp::new("com.example.mail", "Mail"),
            InstalledApp::new("com.example.game", "Game"),
        ],
    };

    let outcome = service.reconcile_from(&source).unwrap();
    assert_eq!(outcome.added, 2);
    assert_eq!(outcome.removed, 0);
}

#[test]
fn reconcile_from_failing_source_surfaces_platform_error() {
    let conn = open_db_in_memory().unwrap();
    let service = ReconcileService::new(SqliteAppRepository::try_new(&conn).unwrap());

    let err = service.reconcile_from(&FailingAppSource).unwrap_err();
    assert!(matches!(err, ReconcileError::Platform(_)));
}

#[test]
fn present_apps_drops_entries_without_resolvable_icons() {
    let icons = StubIcons {
        icons: HashMap::from([
            ("com.example.mail".to_string(), "mail-icon"),
            ("com.example.game".to_string(), "game-icon"),
        ]),
    };

    let listed = vec![
        AppEntry::new("com.example.mail", "Mail"),
        AppEntry::new("com.example.gone", "Gone"),
        AppEntry::new("com.example.game", "Game"),
    ];

    let presented = present_apps(listed, &icons);
    let summary: Vec<(&str, &str)> = presented
        .iter()
        .map(|item| (item.app.package_name.as_str(), item.icon))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("com.example.mail", "mail-icon"),
            ("com.example.game", "game-icon")
        ]
    );
}
