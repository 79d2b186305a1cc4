//! Compensation and best-effort cleanup for files written outside the database.

use std::fmt;

use tracing::{debug, warn};

use crate::storage::{FileStore, Root};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    UpdatePhoto,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Create => "create",
            Operation::UpdatePhoto => "update_photo",
            Operation::Delete => "delete",
        })
    }
}

/// A file that should have been removed but was left on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupEvent {
    pub operation: Operation,
    pub root: Root,
    pub filename: String,
    pub error: String,
}

pub trait CleanupReporter: Send + Sync {
    fn report(&self, event: CleanupEvent);
}

/// Emits cleanup failures as structured log events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl CleanupReporter for TracingReporter {
    fn report(&self, event: CleanupEvent) {
        warn!(
            operation = %event.operation,
            root = %event.root,
            filename = %event.filename,
            error = %event.error,
            "file cleanup failed, orphan left on disk"
        );
    }
}

async fn remove(
    files: &dyn FileStore,
    reporter: &dyn CleanupReporter,
    operation: Operation,
    root: Root,
    filename: &str,
) {
    if let Err(e) = files.delete(root, filename).await {
        reporter.report(CleanupEvent {
            operation,
            root,
            filename: filename.to_string(),
            error: e.to_string(),
        });
    }
}

/// Files written so far by one operation, undone if a later step fails.
#[derive(Debug)]
pub struct Saga {
    operation: Operation,
    written: Vec<(Root, String)>,
}

impl Saga {
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            written: Vec::new(),
        }
    }

    pub fn record(&mut self, root: Root, filename: &str) {
        self.written.push((root, filename.to_string()));
    }

    /// Deletes recorded files newest first. Failures are reported, never returned.
    pub async fn compensate(self, files: &dyn FileStore, reporter: &dyn CleanupReporter) {
        debug!(operation = %self.operation, files = self.written.len(), "compensating");
        for (root, filename) in self.written.into_iter().rev() {
            remove(files, reporter, self.operation, root, &filename).await;
        }
    }

    /// The operation committed; keep everything written.
    pub fn commit(self) {
        debug!(operation = %self.operation, files = self.written.len(), "committed");
    }
}

/// Forward cleanup of a no longer referenced filename in both roots.
pub async fn discard(
    files: &dyn FileStore,
    reporter: &dyn CleanupReporter,
    operation: Operation,
    filename: &str,
) {
    for root in [Root::Thumbnails, Root::Photos] {
        remove(files, reporter, operation, root, filename).await;
    }
}

#[cfg(test)]
mod saga_tests {
    use super::*;
    use crate::test_support::{FaultyFileStore, RecordingReporter, TestRoots};
    use bytes::Bytes;

    async fn put(files: &dyn FileStore, root: Root, name: &str) {
        files.write(root, name, Bytes::from_static(b"x")).await.unwrap();
    }

    #[tokio::test]
    async fn compensate_removes_recorded_files_only() {
        let roots = TestRoots::new();
        let files = roots.store();
        let reporter = RecordingReporter::default();
        put(&files, Root::Photos, "keep.jpeg").await;
        put(&files, Root::Photos, "new.jpeg").await;
        put(&files, Root::Thumbnails, "new.jpeg").await;

        let mut saga = Saga::new(Operation::Create);
        saga.record(Root::Photos, "new.jpeg");
        saga.record(Root::Thumbnails, "new.jpeg");
        saga.compensate(&files, &reporter).await;

        assert_eq!(roots.photo_names(), vec!["keep.jpeg"]);
        assert!(roots.thumbnail_names().is_empty());
        assert!(reporter.events().is_empty());
    }

    #[tokio::test]
    async fn commit_keeps_files() {
        let roots = TestRoots::new();
        let files = roots.store();
        put(&files, Root::Photos, "a.jpeg").await;
        let mut saga = Saga::new(Operation::UpdatePhoto);
        saga.record(Root::Photos, "a.jpeg");
        saga.commit();
        assert_eq!(roots.photo_names(), vec!["a.jpeg"]);
    }

    #[tokio::test]
    async fn discard_reports_each_failure_and_continues() {
        let roots = TestRoots::new();
        let files = FaultyFileStore::new(roots.store());
        let reporter = RecordingReporter::default();
        put(&files, Root::Photos, "old.jpeg").await;
        put(&files, Root::Thumbnails, "old.jpeg").await;
        files.fail_deletes_in(Root::Thumbnails);

        discard(&files, &reporter, Operation::Delete, "old.jpeg").await;

        assert!(roots.photo_names().is_empty());
        assert_eq!(roots.thumbnail_names(), vec!["old.jpeg"]);
        let events = reporter.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].operation, Operation::Delete);
        assert_eq!(events[0].root, Root::Thumbnails);
        assert_eq!(events[0].filename, "old.jpeg");
    }

    #[tokio::test]
    async fn discarding_absent_files_is_silent() {
        let roots = TestRoots::new();
        let files = roots.store();
        let reporter = RecordingReporter::default();
        discard(&files, &reporter, Operation::Delete, "gone.jpeg").await;
        assert!(reporter.events().is_empty());
    }
}
