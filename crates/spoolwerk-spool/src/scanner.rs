// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Inbox scanner.
//
// Lists the inbox once per tick and moves every eligible document into the
// queue directory.  The rename is the hand-over point: from then on the
// document is only reachable through its queue path.

use std::fs::DirEntry;
use std::path::{Path, PathBuf};

use tracing::{debug, info, trace, warn};

use spoolwerk_core::error::SpoolError;
use spoolwerk_core::types::{DocumentType, SpoolFile, TERMINATION_MARKER};

/// What one pass over the inbox found.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Documents moved into the queue directory, in listing order.
    pub queued: Vec<SpoolFile>,
    /// The termination marker was seen (and consumed) this pass.
    pub terminate: bool,
}

/// Moves finished documents from the inbox into the queue directory.
pub struct InboxScanner {
    inbox: PathBuf,
    queue_dir: PathBuf,
    document_type: DocumentType,
}

impl InboxScanner {
    pub fn new(inbox: PathBuf, queue_dir: PathBuf, document_type: DocumentType) -> Self {
        Self {
            inbox,
            queue_dir,
            document_type,
        }
    }

    pub fn queue_dir(&self) -> &Path {
        &self.queue_dir
    }

    /// Scan the inbox once.
    ///
    /// Entries are visited in file-name order.  The marker stops the pass:
    /// anything that sorts after it stays in the inbox.  Filesystem errors
    /// are logged and never abort the pass.
    pub fn scan(&self) -> ScanOutcome {
        let mut outcome = ScanOutcome::default();

        let mut entries: Vec<DirEntry> = match std::fs::read_dir(&self.inbox) {
            Ok(iter) => iter.filter_map(|entry| entry.ok()).collect(),
            Err(e) => {
                warn!(inbox = %self.inbox.display(), error = %e, "cannot list inbox");
                return outcome;
            }
        };
        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            // Subdirectories (the queue itself included) are not ours.
            // Symlinks count as what they point to; the link itself is what
            // gets moved and later removed.
            if !std::fs::metadata(entry.path()).is_ok_and(|meta| meta.is_file()) {
                continue;
            }

            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                trace!(entry = ?file_name, "skipping non UTF-8 name");
                continue;
            };

            if name == TERMINATION_MARKER {
                info!("termination marker found, stopping service");
                if let Err(e) = std::fs::remove_file(entry.path()) {
                    warn!(error = %e, "cannot remove termination marker");
                }
                outcome.terminate = true;
                break;
            }

            if !self.document_type.matches(name) {
                trace!(name, "ignoring entry");
                continue;
            }

            match self.claim(name, entry.path()) {
                Ok(Some(file)) => outcome.queued.push(file),
                Ok(None) => {}
                Err(e) => warn!(error = %e, "skipping document"),
            }
        }

        outcome
    }

    /// Rename one inbox document into the queue directory.
    ///
    /// Returns `Ok(None)` when a document of the same name is still queued;
    /// the inbox copy is left for a later tick rather than overwriting it.
    fn claim(&self, name: &str, origin: PathBuf) -> Result<Option<SpoolFile>, SpoolError> {
        let queued = self.queue_dir.join(name);
        if queued.exists() {
            debug!(name, "same name still queued, deferring");
            return Ok(None);
        }

        std::fs::rename(&origin, &queued).map_err(|source| SpoolError::Rename {
            from: origin.clone(),
            to: queued.clone(),
            source,
        })?;

        debug!(name, queued = %queued.display(), "new file");
        Ok(Some(SpoolFile::new(name, origin, queued)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (tempfile::TempDir, InboxScanner) {
        let dir = tempfile::tempdir().expect("tempdir");
        let queue = dir.path().join("queue");
        std::fs::create_dir(&queue).expect("queue dir");
        let scanner = InboxScanner::new(dir.path().to_path_buf(), queue, DocumentType::Pdf);
        (dir, scanner)
    }

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), name.as_bytes()).expect("write");
    }

    fn names(outcome: &ScanOutcome) -> Vec<&str> {
        outcome.queued.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn moves_matching_documents_in_name_order() {
        let (dir, scanner) = setup();
        touch(dir.path(), "c.pdf");
        touch(dir.path(), "a.pdf");
        touch(dir.path(), "b.pdf");

        let outcome = scanner.scan();
        assert!(!outcome.terminate);
        assert_eq!(names(&outcome), ["a.pdf", "b.pdf", "c.pdf"]);

        for file in &outcome.queued {
            assert!(!file.origin.exists(), "still in inbox: {}", file.name);
            assert!(file.queued.exists(), "not in queue: {}", file.name);
            assert_eq!(file.queued, scanner.queue_dir().join(&file.name));
        }
    }

    #[test]
    fn ignores_other_extensions_and_directories() {
        let (dir, scanner) = setup();
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "upper.PDF");
        std::fs::create_dir(dir.path().join("folder.pdf")).expect("subdir");

        let outcome = scanner.scan();
        assert!(outcome.queued.is_empty());
        assert!(dir.path().join("notes.txt").exists());
        assert!(dir.path().join("upper.PDF").exists());
        assert!(dir.path().join("folder.pdf").is_dir());
    }

    #[test]
    fn marker_is_consumed_and_stops_the_pass() {
        let (dir, scanner) = setup();
        touch(dir.path(), "a.pdf");
        touch(dir.path(), TERMINATION_MARKER);
        touch(dir.path(), "z.pdf");

        let outcome = scanner.scan();
        assert!(outcome.terminate);
        assert_eq!(names(&outcome), ["a.pdf"]);
        assert!(!dir.path().join(TERMINATION_MARKER).exists());
        // Sorted after the marker: left untouched in the inbox.
        assert!(dir.path().join("z.pdf").exists());
        assert!(!scanner.queue_dir().join("z.pdf").exists());
    }

    #[test]
    fn marker_alone_triggers_termination() {
        let (dir, scanner) = setup();
        touch(dir.path(), TERMINATION_MARKER);

        let outcome = scanner.scan();
        assert!(outcome.terminate);
        assert!(outcome.queued.is_empty());
    }

    #[test]
    fn marker_directory_is_not_a_marker() {
        let (dir, scanner) = setup();
        std::fs::create_dir(dir.path().join(TERMINATION_MARKER)).expect("subdir");

        assert!(!scanner.scan().terminate);
    }

    #[test]
    fn same_name_still_queued_is_deferred() {
        let (dir, scanner) = setup();
        touch(scanner.queue_dir(), "a.pdf");
        std::fs::write(dir.path().join("a.pdf"), b"second").expect("write");

        let outcome = scanner.scan();
        assert!(outcome.queued.is_empty());
        assert_eq!(std::fs::read(dir.path().join("a.pdf")).expect("read"), b"second");
        assert_eq!(std::fs::read(scanner.queue_dir().join("a.pdf")).expect("read"), b"a.pdf");
    }

    #[test]
    fn rename_failure_skips_entry() {
        let dir = tempfile::tempdir().expect("tempdir");
        touch(dir.path(), "a.pdf");
        // Queue directory was never created, so the rename fails.
        let scanner = InboxScanner::new(
            dir.path().to_path_buf(),
            dir.path().join("missing-queue"),
            DocumentType::Pdf,
        );

        let outcome = scanner.scan();
        assert!(outcome.queued.is_empty());
        assert!(dir.path().join("a.pdf").exists());
    }

    #[test]
    fn missing_inbox_yields_empty_outcome() {
        let dir = tempfile::tempdir().expect("tempdir");
        let scanner = InboxScanner::new(
            dir.path().join("nope"),
            dir.path().join("nope/queue"),
            DocumentType::Pdf,
        );
        let outcome = scanner.scan();
        assert!(outcome.queued.is_empty());
        assert!(!outcome.terminate);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_entries_follow_their_target() {
        use std::os::unix::fs::symlink;

        let (dir, scanner) = setup();
        let elsewhere = tempfile::tempdir().expect("tempdir");
        touch(elsewhere.path(), "real.pdf");
        touch(elsewhere.path(), "stop");
        symlink(elsewhere.path().join("real.pdf"), dir.path().join("a.pdf")).expect("link");
        symlink(elsewhere.path(), dir.path().join("b.pdf")).expect("dir link");
        symlink(elsewhere.path().join("gone.pdf"), dir.path().join("c.pdf")).expect("dangling");
        symlink(elsewhere.path().join("stop"), dir.path().join(TERMINATION_MARKER))
            .expect("marker link");

        let outcome = scanner.scan();
        assert!(outcome.terminate);
        assert_eq!(names(&outcome), ["a.pdf"]);
        assert!(scanner.queue_dir().join("a.pdf").exists());
        // Only the link is consumed, never its target.
        assert!(elsewhere.path().join("real.pdf").exists());
        assert!(elsewhere.path().join("stop").exists());
        assert!(!dir.path().join(TERMINATION_MARKER).exists());
        assert!(dir.path().join("b.pdf").is_dir());
    }
}
