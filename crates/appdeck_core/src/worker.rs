//! Background catalog worker.
//!
//! # Responsibility
//! - Own the catalog connection on a dedicated thread.
//! - Execute submitted jobs off the caller's thread, in submission order.
//! - Publish a fresh snapshot through the hub after every job.
//!
//! # Invariants
//! - All entity writes are serialized by the single worker thread; jobs
//!   from one caller run in the order they were submitted.
//! - `submit` never blocks the caller; in-flight jobs always run to
//!   completion even when the caller loses interest.

use crate::watch::{load_snapshot, CatalogHub};
use log::{error, info};
use rusqlite::Connection;
use std::sync::mpsc::{channel, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;

type Job = Box<dyn FnOnce(&Connection) + Send>;

/// Errors from job submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerError {
    /// The worker thread has stopped accepting jobs.
    Closed,
}

impl std::fmt::Display for WorkerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "catalog worker is no longer running"),
        }
    }
}

impl std::error::Error for WorkerError {}

/// Single-threaded executor owning one catalog connection.
pub struct CatalogWorker {
    sender: Option<Sender<Job>>,
    join: Option<JoinHandle<()>>,
    hub: Arc<CatalogHub>,
}

impl CatalogWorker {
    /// Moves the connection onto a new worker thread and publishes the
    /// initial snapshot.
    pub fn spawn(conn: Connection) -> std::io::Result<Self> {
        let hub = Arc::new(CatalogHub::new());
        let worker_hub = Arc::clone(&hub);
        let (sender, receiver) = channel::<Job>();

        let join = std::thread::Builder::new()
            .name("appdeck-catalog".to_string())
            .spawn(move || {
                publish_current(&conn, &worker_hub);
                while let Ok(job) = receiver.recv() {
                    job(&conn);
                    publish_current(&conn, &worker_hub);
                }
                info!("event=worker_stop module=worker status=ok");
            })?;

        Ok(Self {
            sender: Some(sender),
            join: Some(join),
            hub,
        })
    }

    /// The hub this worker publishes through.
    pub fn hub(&self) -> Arc<CatalogHub> {
        Arc::clone(&self.hub)
    }

    /// Enqueues one job for background execution.
    ///
    /// Results travel back through whatever channel the caller captured in
    /// the closure; the worker itself only guarantees execution order.
    pub fn submit(&self, job: impl FnOnce(&Connection) + Send + 'static) -> Result<(), WorkerError> {
        match &self.sender {
            Some(sender) => sender.send(Box::new(job)).map_err(|_| WorkerError::Closed),
            None => Err(WorkerError::Closed),
        }
    }

    /// Drains outstanding jobs, then stops the worker thread.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        // Dropping the sender ends the receive loop after queued jobs ran.
        self.sender.take();
        if let Some(join) = self.join.take() {
            if join.join().is_err() {
                error!("event=worker_stop module=worker status=error error_code=worker_panicked");
            }
        }
    }
}

impl Drop for CatalogWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn publish_current(conn: &Connection, hub: &CatalogHub) {
    match load_snapshot(conn) {
        Ok(snapshot) => {
            hub.publish(snapshot);
        }
        Err(err) => {
            error!(
                "event=snapshot_publish module=worker status=error error_code=snapshot_failed error={err}"
            );
        }
    }
}
