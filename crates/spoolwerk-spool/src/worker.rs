// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print worker: the single background task that turns queued documents into
// print submissions, strictly one at a time.

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info, info_span, warn};

use spoolwerk_core::error::{Result, SpoolError};
use spoolwerk_core::types::{SpoolFile, WorkItem, WorkerReport};
use spoolwerk_print::PrintBackend;

use crate::channel::WorkReceiver;

/// Consumes the work channel and drives the print backend.
///
/// Built with its channel end and backend explicitly; it shares nothing else
/// with the service loop.
pub struct PrintWorker<B: PrintBackend> {
    receiver: WorkReceiver,
    backend: B,
}

impl<B: PrintBackend> PrintWorker<B> {
    pub fn new(receiver: WorkReceiver, backend: B) -> Self {
        Self { receiver, backend }
    }

    /// Run on the tokio runtime.
    pub fn spawn(self) -> WorkerHandle {
        WorkerHandle {
            inner: tokio::spawn(self.run()),
        }
    }

    /// Process items until the shutdown sentinel arrives (or every sender is
    /// dropped), then report what was done.
    pub async fn run(mut self) -> WorkerReport {
        info!(backend = self.backend.name(), "print worker started");
        let mut report = WorkerReport::default();

        loop {
            match self.receiver.recv().await {
                Some(WorkItem::File(file)) => {
                    let span = info_span!("job", job_id = %file.id, name = %file.name);
                    self.process(&file, &mut report).instrument(span).await;
                    self.receiver.ack();
                }
                Some(WorkItem::Shutdown) => {
                    debug!("shutdown sentinel received");
                    break;
                }
                None => {
                    warn!("work channel closed without a shutdown sentinel");
                    break;
                }
            }
        }

        info!(
            printed = report.printed,
            failed = report.failed,
            "print worker stopped"
        );
        report
    }

    /// Submit one document, then remove it whatever the outcome.  There is
    /// no retry, so a file leaves the spool once an attempt has been made.
    async fn process(&self, file: &SpoolFile, report: &mut WorkerReport) {
        let waited_ms = (Utc::now() - file.discovered_at).num_milliseconds();
        debug!(path = %file.queued.display(), waited_ms, "printing file");

        match self.backend.submit(&file.queued).await {
            Ok(()) => report.printed += 1,
            Err(e) => {
                warn!(error = %e, "print submission failed, dropping file");
                report.failed += 1;
            }
        }

        if let Err(source) = tokio::fs::remove_file(&file.queued).await {
            let e = SpoolError::Remove {
                path: file.queued.clone(),
                source,
            };
            warn!(error = %e, "cannot remove printed file");
            report.cleanup_failures += 1;
        } else {
            debug!("file removed from queue");
        }
    }
}

/// Join handle for a spawned [`PrintWorker`].
#[derive(Debug)]
pub struct WorkerHandle {
    inner: JoinHandle<WorkerReport>,
}

impl WorkerHandle {
    /// Whether the worker task has already exited.
    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    /// Wait for the worker to exit.  Must not be called again after it has
    /// resolved.
    pub async fn join(&mut self) -> Result<WorkerReport> {
        (&mut self.inner)
            .await
            .map_err(|e| SpoolError::WorkerExited(e.to_string()))
    }
}
