use appdeck_core::db::migrations::latest_version;
use appdeck_core::db::open_db_in_memory;
use appdeck_core::{
    AppEntry, AppRepository, FolderRepository, RepoError, SqliteAppRepository,
    SqliteFolderRepository,
};
use rusqlite::Connection;

#[test]
fn upsert_inserts_new_rows_and_reports_count() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAppRepository::try_new(&conn).unwrap();

    let batch = vec![
        AppEntry::new("com.example.mail", "Mail"),
        AppEntry::new("com.example.game", "Game"),
    ];
    assert_eq!(repo.upsert_apps(&batch).unwrap(), 2);
    assert_eq!(repo.upsert_apps(&batch).unwrap(), 0);
    assert_eq!(repo.list_apps().unwrap().len(), 2);
}

#[test]
fn upsert_conflict_preserves_existing_row_and_assignment() {
    let conn = open_db_in_memory().unwrap();
    let apps = SqliteAppRepository::try_new(&conn).unwrap();
    let folders = SqliteFolderRepository::try_new(&conn).unwrap();

    apps.upsert_apps(&[AppEntry::new("com.example.mail", "Mail")])
        .unwrap();
    let work = folders.create_folder("Work").unwrap();
    let assigned = AppEntry::new("com.example.mail", "Mail").assigned_to(Some(work.id));
    apps.update_app(&assigned).unwrap();

    // A later upsert of the same package must not disturb the stored row.
    let inserted = apps
        .upsert_apps(&[AppEntry::new("com.example.mail", "Mail 2.0")])
        .unwrap();
    assert_eq!(inserted, 0);

    let stored = apps.get_app("com.example.mail").unwrap().unwrap();
    assert_eq!(stored.app_name, "Mail");
    assert_eq!(stored.folder_id, Some(work.id));
}

#[test]
fn listings_are_ordered_by_display_name_case_insensitively() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAppRepository::try_new(&conn).unwrap();

    repo.upsert_apps(&[
        AppEntry::new("com.example.c", "cherry"),
        AppEntry::new("com.example.a", "Apple"),
        AppEntry::new("com.example.b", "banana"),
    ])
    .unwrap();

    let names: Vec<String> = repo
        .list_apps()
        .unwrap()
        .into_iter()
        .map(|app| app.app_name)
        .collect();
    assert_eq!(names, vec!["Apple", "banana", "cherry"]);
}

#[test]
fn uncategorized_and_in_folder_listings_filter_correctly() {
    let conn = open_db_in_memory().unwrap();
    let apps = SqliteAppRepository::try_new(&conn).unwrap();
    let folders = SqliteFolderRepository::try_new(&conn).unwrap();

    apps.upsert_apps(&[
        AppEntry::new("com.example.mail", "Mail"),
        AppEntry::new("com.example.game", "Game"),
        AppEntry::new("com.example.misc", "Misc"),
    ])
    .unwrap();
    let work = folders.create_folder("Work").unwrap();
    apps.update_app(&AppEntry::new("com.example.mail", "Mail").assigned_to(Some(work.id)))
        .unwrap();

    let uncategorized: Vec<String> = apps
        .list_uncategorized()
        .unwrap()
        .into_iter()
        .map(|app| app.package_name)
        .collect();
    assert_eq!(uncategorized, vec!["com.example.game", "com.example.misc"]);

    let in_work: Vec<String> = apps
        .list_in_folder(work.id)
        .unwrap()
        .into_iter()
        .map(|app| app.package_name)
        .collect();
    assert_eq!(in_work, vec!["com.example.mail"]);
}

#[test]
fn update_replaces_full_row() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAppRepository::try_new(&conn).unwrap();

    repo.upsert_apps(&[AppEntry::new("com.example.mail", "Mail")])
        .unwrap();
    repo.update_app(&AppEntry::new("com.example.mail", "Mail Pro"))
        .unwrap();

    let stored = repo.get_app("com.example.mail").unwrap().unwrap();
    assert_eq!(stored.app_name, "Mail Pro");
    assert_eq!(stored.folder_id, None);
}

#[test]
fn update_missing_row_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAppRepository::try_new(&conn).unwrap();

    let err = repo
        .update_app(&AppEntry::new("com.example.ghost", "Ghost"))
        .unwrap_err();
    assert!(matches!(err, RepoError::AppNotFound(name) if name == "com.example.ghost"));
}

#[test]
fn delete_by_package_reports_whether_a_row_was_removed() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAppRepository::try_new(&conn).unwrap();

    repo.upsert_apps(&[AppEntry::new("com.example.mail", "Mail")])
        .unwrap();

    assert!(repo.delete_by_package("com.example.mail").unwrap());
    assert!(!repo.delete_by_package("com.example.mail").unwrap());
    assert!(repo.list_apps().unwrap().is_empty());
}

#[test]
fn blank_package_name_is_rejected_before_write() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAppRepository::try_new(&conn).unwrap();

    let err = repo.upsert_apps(&[AppEntry::new("   ", "Blank")]).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert!(repo.list_apps().unwrap().is_empty());
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteAppRepository::try_new(&conn);
    match result {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_required_tables() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteAppRepository::try_new(&conn);
    assert!(matches!(result, Err(RepoError::MissingRequiredTable("apps"))));
}

#[test]
fn repository_rejects_connection_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE apps (
            package_name TEXT PRIMARY KEY NOT NULL,
            app_name TEXT NOT NULL
        );
        CREATE TABLE folders (
            folder_uuid TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            sort_order INTEGER NOT NULL DEFAULT 0
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteAppRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "apps",
            column: "folder_uuid"
        })
    ));
}
