// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shutdown coordinator: the DRAINING → TERMINATED transition.
//
// 1. Barrier: wait until every document already handed to the worker has
//    been acknowledged.  This is a wait on the outstanding count, never a
//    fixed sleep.
// 2. Send the shutdown sentinel (consuming the sender) and join the worker.
// 3. Remove the queue directory and everything left in it.
//
// Callers must have stopped scanning before calling `drain`; the queue
// directory is deleted at the end and a concurrent rename into it would be
// lost.

use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use spoolwerk_core::error::{Result, SpoolError};
use spoolwerk_core::types::WorkerReport;

use crate::channel::WorkSender;
use crate::worker::WorkerHandle;

pub struct ShutdownCoordinator {
    queue_dir: PathBuf,
}

impl ShutdownCoordinator {
    pub fn new(queue_dir: impl Into<PathBuf>) -> Self {
        Self {
            queue_dir: queue_dir.into(),
        }
    }

    /// Drain, stop the worker, reclaim the queue directory.
    ///
    /// If the worker exits before the barrier is reached the queue directory
    /// is left alone, since it may still hold documents nobody printed.
    pub async fn drain(
        self,
        sender: WorkSender,
        mut worker: WorkerHandle,
    ) -> Result<WorkerReport> {
        info!(outstanding = sender.outstanding(), "waiting for queued files to finish");

        tokio::select! {
            () = sender.wait_idle() => {
                debug!("work channel drained");
            }
            early = worker.join() => {
                let detail = match early {
                    Ok(report) => format!("stopped after {} jobs", report.attempted()),
                    Err(e) => e.to_string(),
                };
                error!(
                    outstanding = sender.outstanding(),
                    queue_dir = %self.queue_dir.display(),
                    "print worker exited early, leaving queue directory in place"
                );
                return Err(SpoolError::WorkerExited(detail));
            }
        }

        debug!("stopping print worker");
        sender.send_shutdown()?;
        let report = worker.join().await?;
        info!(printed = report.printed, failed = report.failed, "print worker terminated");

        debug!(queue_dir = %self.queue_dir.display(), "deleting queue directory");
        remove_queue_dir(&self.queue_dir)?;
        Ok(report)
    }
}

/// Recursively delete the queue directory.  Already gone is fine.
fn remove_queue_dir(path: &Path) -> Result<()> {
    match std::fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(queue_dir = %path.display(), "queue directory already gone");
            Ok(())
        }
        Err(source) => Err(SpoolError::Remove {
            path: path.to_path_buf(),
            source,
        }),
    }
}
