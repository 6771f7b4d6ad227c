//! Transactional course store with live result-set subscriptions.
//!
//! # Responsibility
//! - Own the SQLite connection and serialize all access through it.
//! - Run mutations as all-or-nothing write transactions.
//! - Push immutable full-result-set snapshots to watchers after every
//!   result-changing commit.
//!
//! # Invariants
//! - Watchers only ever observe committed state; never a partial write.
//! - Snapshots are delivered in commit order; no out-of-order delivery.
//! - A watcher's first delivery is the snapshot current at subscription
//!   time.
//! - Dropped watchers are pruned on the next publish; with none attached
//!   the store merely keeps its latest snapshot current.

use crate::db::{open_db, open_db_in_memory};
use crate::model::course::Course;
use crate::repo::course_repo::{CourseRepository, RepoResult, SqliteCourseRepository};
use log::{debug, info};
use rusqlite::{Connection, Transaction};
use std::path::Path;
use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::sync::{mpsc, Mutex, MutexGuard, PoisonError};

/// Immutable full-result-set snapshot handed to watchers.
pub type CourseSnapshot = std::sync::Arc<Vec<Course>>;

/// Durable, transactional storage handle for the course catalog.
///
/// Opened once at application start and injected into every consumer;
/// core code never reaches for a process-global.
pub struct CourseStore {
    conn: Mutex<Connection>,
    watchers: Mutex<Vec<Sender<CourseSnapshot>>>,
    latest: Mutex<CourseSnapshot>,
}

impl CourseStore {
    /// Opens (or creates) the database file and loads the initial snapshot.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        Self::from_connection(open_db(path)?)
    }

    /// Opens a fresh in-memory database. Used by tests and the CLI probe.
    pub fn open_in_memory() -> RepoResult<Self> {
        Self::from_connection(open_db_in_memory()?)
    }

    fn from_connection(conn: Connection) -> RepoResult<Self> {
        let initial = SqliteCourseRepository::new(&conn).list_courses()?;
        info!(
            "event=store_open module=store status=ok courses={}",
            initial.len()
        );
        Ok(Self {
            conn: Mutex::new(conn),
            watchers: Mutex::new(Vec::new()),
            latest: Mutex::new(CourseSnapshot::new(initial)),
        })
    }

    /// Runs `op` inside a single atomic write transaction.
    ///
    /// Commits when `op` returns `Ok`, rolls back otherwise. After a
    /// successful commit the full course list is recomputed and, if it
    /// changed, published to every live watcher.
    pub fn write<T>(
        &self,
        op: impl FnOnce(&Transaction<'_>) -> RepoResult<T>,
    ) -> RepoResult<T> {
        let mut conn = lock_unpoisoned(&self.conn);
        let tx = conn.transaction().map_err(crate::db::DbError::from)?;
        let out = op(&tx)?;
        tx.commit().map_err(crate::db::DbError::from)?;

        self.publish(&conn)?;
        Ok(out)
    }

    /// Runs `op` with shared read access outside any transaction.
    pub fn read<T>(&self, op: impl FnOnce(&Connection) -> RepoResult<T>) -> RepoResult<T> {
        let conn = lock_unpoisoned(&self.conn);
        op(&conn)
    }

    /// Returns the last published snapshot without touching the database.
    pub fn latest_snapshot(&self) -> CourseSnapshot {
        lock_unpoisoned(&self.latest).clone()
    }

    /// Subscribes to the live "all courses" query.
    ///
    /// The returned watcher immediately holds the current snapshot and then
    /// receives one snapshot per result-changing commit, in commit order.
    pub fn observe(&self) -> CourseWatcher {
        let (tx, rx) = mpsc::channel();
        // Seed and register under the latest-snapshot lock so a commit
        // racing with subscription cannot slip between seed and register.
        let latest = lock_unpoisoned(&self.latest);
        let _ = tx.send(latest.clone());
        lock_unpoisoned(&self.watchers).push(tx);
        CourseWatcher { rx }
    }

    /// Recomputes the result set and fans it out when it changed.
    ///
    /// Called with the connection lock held, which keeps publishes in
    /// commit order.
    fn publish(&self, conn: &Connection) -> RepoResult<()> {
        let current = SqliteCourseRepository::new(conn).list_courses()?;

        let mut latest = lock_unpoisoned(&self.latest);
        if current == **latest {
            return Ok(());
        }
        *latest = CourseSnapshot::new(current);

        let mut watchers = lock_unpoisoned(&self.watchers);
        watchers.retain(|watcher| watcher.send(latest.clone()).is_ok());
        debug!(
            "event=snapshot_published module=store status=ok courses={} watchers={}",
            latest.len(),
            watchers.len()
        );
        Ok(())
    }
}

/// Lazy, infinite sequence of committed course-list snapshots.
///
/// Dropping the watcher detaches it; the store prunes the dead channel on
/// its next publish.
pub struct CourseWatcher {
    rx: Receiver<CourseSnapshot>,
}

impl CourseWatcher {
    /// Blocks until the next snapshot arrives.
    ///
    /// Returns `None` when the store side has gone away.
    pub fn recv(&self) -> Option<CourseSnapshot> {
        self.rx.recv().ok()
    }

    /// Returns a pending snapshot without blocking, `None` when there is
    /// nothing queued.
    pub fn try_recv(&self) -> Option<CourseSnapshot> {
        match self.rx.try_recv() {
            Ok(snapshot) => Some(snapshot),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}

impl Iterator for CourseWatcher {
    type Item = CourseSnapshot;

    fn next(&mut self) -> Option<Self::Item> {
        self.recv()
    }
}

// A poisoned lock only means another caller panicked mid-operation; any
// open transaction was already rolled back on unwind, so the guarded
// state is still consistent.
fn lock_unpoisoned<'a, T>(mutex: &'a Mutex<T>) -> MutexGuard<'a, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
