use appdeck_core::db::open_db_in_memory;
use appdeck_core::{
    AppEntry, AppRepository, AssignmentService, CatalogHub, CatalogSnapshot, CatalogWorker,
    Folder, FolderRepository, FolderService, SqliteAppRepository, SqliteFolderRepository,
    WorkerError,
};
use std::sync::mpsc::{channel, Receiver};
use std::time::{Duration, Instant};

const WAIT: Duration = Duration::from_secs(5);

#[test]
fn hub_notifies_subscribers_on_changed_snapshots_only() {
    let hub = CatalogHub::new();
    let (tx, rx) = channel::<CatalogSnapshot>();
    hub.subscribe(move |snapshot| {
        tx.send(snapshot.clone()).ok();
    });

    let first = snapshot_with_folder("Work");
    assert!(hub.publish(first.clone()));
    assert_eq!(rx.recv_timeout(WAIT).unwrap(), first);

    // Identical snapshot: compare-before-notify suppresses delivery.
    assert!(!hub.publish(first.clone()));
    assert!(rx.try_recv().is_err());

    let second = snapshot_with_folder("Games");
    assert!(hub.publish(second.clone()));
    assert_eq!(rx.recv_timeout(WAIT).unwrap(), second);
}

#[test]
fn hub_replays_last_snapshot_to_new_subscribers() {
    let hub = CatalogHub::new();
    let published = snapshot_with_folder("Work");
    hub.publish(published.clone());

    let (tx, rx) = channel::<CatalogSnapshot>();
    hub.subscribe(move |snapshot| {
        tx.send(snapshot.clone()).ok();
    });

    assert_eq!(rx.recv_timeout(WAIT).unwrap(), published);
}

#[test]
fn unsubscribed_callbacks_stop_receiving() {
    let hub = CatalogHub::new();
    let (tx, rx) = channel::<CatalogSnapshot>();
    let id = hub.subscribe(move |snapshot| {
        tx.send(snapshot.clone()).ok();
    });

    assert!(hub.unsubscribe(id));
    assert!(!hub.unsubscribe(id));
    assert_eq!(hub.subscriber_count(), 0);

    hub.publish(snapshot_with_folder("Work"));
    assert!(rx.try_recv().is_err());
}

#[test]
fn worker_publishes_snapshots_after_each_job() {
    let conn = open_db_in_memory().unwrap();
    let worker = CatalogWorker::spawn(conn).unwrap();

    let hub = worker.hub();
    let (tx, rx) = channel::<CatalogSnapshot>();
    hub.subscribe(move |snapshot| {
        tx.send(snapshot.clone()).ok();
    });

    worker
        .submit(|conn| {
            let service = FolderService::new(SqliteFolderRepository::try_new(conn).unwrap());
            service.create_folder("Work").unwrap();
        })
        .unwrap();

    let snapshot = wait_for(&rx, |snapshot| !snapshot.folders.is_empty());
    assert_eq!(snapshot.folders[0].name, "Work");

    worker.shutdown();
}

#[test]
fn worker_runs_jobs_in_submission_order() {
    let conn = open_db_in_memory().unwrap();
    let worker = CatalogWorker::spawn(conn).unwrap();

    let hub = worker.hub();
    let (tx, rx) = channel::<CatalogSnapshot>();
    hub.subscribe(move |snapshot| {
        tx.send(snapshot.clone()).ok();
    });

    worker
        .submit(|conn| {
            let service = FolderService::new(SqliteFolderRepository::try_new(conn).unwrap());
            service.create_folder("First").unwrap();
        })
        .unwrap();
    worker
        .submit(|conn| {
            let service = FolderService::new(SqliteFolderRepository::try_new(conn).unwrap());
            service.create_folder("Second").unwrap();
        })
        .unwrap();

    let snapshot = wait_for(&rx, |snapshot| snapshot.folders.len() == 2);
    let summary: Vec<(String, i64)> = snapshot
        .folders
        .into_iter()
        .map(|folder| (folder.name, folder.sort_order))
        .collect();
    assert_eq!(
        summary,
        vec![("First".to_string(), 0), ("Second".to_string(), 1)]
    );

    worker.shutdown();
}

#[test]
fn worker_serializes_reconcile_and_assignment_writes() {
    let conn = open_db_in_memory().unwrap();
    let worker = CatalogWorker::spawn(conn).unwrap();

    let hub = worker.hub();
    let (tx, rx) = channel::<CatalogSnapshot>();
    hub.subscribe(move |snapshot| {
        tx.send(snapshot.clone()).ok();
    });

    worker
        .submit(|conn| {
            let apps = SqliteAppRepository::try_new(conn).unwrap();
            apps.upsert_apps(&[AppEntry::new("com.example.mail", "Mail")])
                .unwrap();
        })
        .unwrap();
    worker
        .submit(|conn| {
            let folders = SqliteFolderRepository::try_new(conn).unwrap();
            let work = folders.create_folder("Work").unwrap();
            let apps = SqliteAppRepository::try_new(conn).unwrap();
            let service = AssignmentService::new(SqliteAppRepository::try_new(conn).unwrap());
            let mail = apps.get_app("com.example.mail").unwrap().unwrap();
            service.assign_app_to_folder(&mail, Some(work.id)).unwrap();
        })
        .unwrap();

    let snapshot = wait_for(&rx, |snapshot| {
        snapshot.apps.first().is_some_and(|app| app.folder_id.is_some())
    });
    assert_eq!(snapshot.folders.len(), 1);
    assert_eq!(snapshot.apps[0].folder_id, Some(snapshot.folders[0].id));

    worker.shutdown();
}

#[test]
fn worker_rejects_jobs_after_thread_exit() {
    let conn = open_db_in_memory().unwrap();
    let worker = CatalogWorker::spawn(conn).unwrap();

    // A panicking job takes the worker thread down; later submissions must
    // report the closed worker instead of silently vanishing.
    worker.submit(|_| panic!("job failure")).unwrap();

    let deadline = Instant::now() + WAIT;
    loop {
        match worker.submit(|_| {}) {
            Err(WorkerError::Closed) => break,
            Ok(()) => {
                assert!(Instant::now() < deadline, "worker never stopped accepting jobs");
                std::thread::sleep(Duration::from_millis(10));
            }
        }
    }
}

fn snapshot_with_folder(name: &str) -> CatalogSnapshot {
    CatalogSnapshot {
        folders: vec![Folder::new(name, 0)],
        apps: Vec::new(),
    }
}

fn wait_for(
    rx: &Receiver<CatalogSnapshot>,
    predicate: impl Fn(&CatalogSnapshot) -> bool,
) -> CatalogSnapshot {
    let deadline = std::time::Instant::now() + WAIT;
    loop {
        let remaining = deadline
            .checked_duration_since(std::time::Instant::now())
            .expect("timed out waiting for catalog snapshot");
        let snapshot = rx
            .recv_timeout(remaining)
            .expect("timed out waiting for catalog snapshot");
        if predicate(&snapshot) {
            return snapshot;
        }
    }
}
