// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service loop.
//
// RUNNING: every tick scans the inbox, buffers what was moved, flushes the
// buffer to the print worker, then sleeps for the poll interval.
// DRAINING: entered when the scanner consumes the termination marker.  No
// further scans happen; the shutdown coordinator waits for the worker to
// finish everything already queued.
// TERMINATED: worker joined and queue directory removed.  If the worker dies
// early the loop still moves to DRAINING, but the shutdown fails and the
// queue directory is kept.

use std::path::Path;
use std::time::Duration;

use tracing::{debug, error, info, trace, warn};

use spoolwerk_core::SpoolConfig;
use spoolwerk_core::error::{Result, SpoolError};
use spoolwerk_core::types::{ServiceState, WorkerReport};
use spoolwerk_print::PrintBackend;

use crate::channel::{WorkSender, work_channel};
use crate::pending::PendingBuffer;
use crate::scanner::InboxScanner;
use crate::shutdown::ShutdownCoordinator;
use crate::worker::{PrintWorker, WorkerHandle};

/// A configured, not yet started spool service.
pub struct SpoolService<B: PrintBackend> {
    config: SpoolConfig,
    backend: B,
}

impl<B: PrintBackend> SpoolService<B> {
    pub fn new(config: SpoolConfig, backend: B) -> Self {
        Self { config, backend }
    }

    /// Create the inbox and queue directories if they are missing.
    pub fn prepare_directories(&self) -> Result<()> {
        ensure_dir(&self.config.root, self.config.dir_mode)?;
        let queue_dir = self.config.queue_dir();
        ensure_dir(&queue_dir, self.config.dir_mode)?;

        let leftovers = std::fs::read_dir(&queue_dir)?.count();
        if leftovers > 0 {
            warn!(
                queue_dir = %queue_dir.display(),
                leftovers,
                "queue directory not empty at startup; leftovers are removed on shutdown"
            );
        }
        Ok(())
    }

    /// Spawn the print worker and hand back the loop that feeds it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(self) -> ServiceLoop {
        let (sender, receiver) = work_channel();
        let worker = PrintWorker::new(receiver, self.backend).spawn();
        let config = self.config;

        ServiceLoop {
            scanner: InboxScanner::new(
                config.root.clone(),
                config.queue_dir(),
                config.document_type,
            ),
            pending: PendingBuffer::new(),
            link: Some(WorkerLink { sender, worker }),
            state: ServiceState::Running,
            poll_interval: config.poll_interval(),
        }
    }

    /// Prepare directories, run until the termination marker, drain, and
    /// clean up.
    pub async fn run(self) -> Result<WorkerReport> {
        self.prepare_directories()?;
        info!(
            inbox = %self.config.root.display(),
            extension = self.config.extension(),
            poll_secs = self.config.poll_interval_secs,
            "spool service started"
        );
        self.start().run().await
    }
}

/// The running service: owns the scanner, the pending buffer and the
/// producer half of the work channel.
pub struct ServiceLoop {
    scanner: InboxScanner,
    pending: PendingBuffer,
    /// Taken by `shutdown`.
    link: Option<WorkerLink>,
    state: ServiceState,
    poll_interval: Duration,
}

struct WorkerLink {
    sender: WorkSender,
    worker: WorkerHandle,
}

impl ServiceLoop {
    pub fn state(&self) -> ServiceState {
        self.state
    }

    /// Documents handed to the worker and not yet finished.
    pub fn outstanding(&self) -> usize {
        self.link.as_ref().map_or(0, |link| link.sender.outstanding())
    }

    /// Whether the print worker task is still running.
    pub fn worker_alive(&self) -> bool {
        self.link
            .as_ref()
            .is_some_and(|link| !link.worker.is_finished())
    }

    /// Run one tick and report the resulting state.
    ///
    /// Outside `Running` this does nothing, so no scan can race the queue
    /// directory removal.
    pub fn tick(&mut self) -> ServiceState {
        if self.state != ServiceState::Running {
            return self.state;
        }

        let outcome = self.scanner.scan();
        self.pending.extend(outcome.queued);
        // Files moved before the marker are already in the queue directory,
        // so they are flushed even on the terminating tick.
        let flushed = self.flush();

        if !flushed || !self.worker_alive() {
            error!("print worker is gone, no longer accepting documents");
            self.transition(ServiceState::Draining);
        } else if outcome.terminate {
            self.transition(ServiceState::Draining);
        }
        self.state
    }

    /// Tick until the marker is seen, then shut down.
    pub async fn run(mut self) -> Result<WorkerReport> {
        while self.tick() == ServiceState::Running {
            tokio::time::sleep(self.poll_interval).await;
        }
        self.shutdown().await
    }

    /// Drain outstanding work, stop the worker and remove the queue
    /// directory.  Scanning stops for good, whatever state the loop was in.
    ///
    /// Only the first call does anything; later calls fail with
    /// `ChannelClosed`.
    pub async fn shutdown(&mut self) -> Result<WorkerReport> {
        if self.state == ServiceState::Running {
            self.transition(ServiceState::Draining);
        }
        let WorkerLink { sender, worker } = self.link.take().ok_or(SpoolError::ChannelClosed)?;
        info!("terminating print worker");

        let coordinator = ShutdownCoordinator::new(self.scanner.queue_dir());
        let report = coordinator.drain(sender, worker).await?;

        self.transition(ServiceState::Terminated);
        info!(
            printed = report.printed,
            failed = report.failed,
            "spool service stopped"
        );
        Ok(report)
    }

    /// Hand every buffered document to the worker, oldest first.  Returns
    /// false if the worker is gone.
    fn flush(&mut self) -> bool {
        let Some(link) = &self.link else {
            return false;
        };
        if !self.pending.is_empty() {
            trace!(count = self.pending.len(), "flushing pending buffer");
        }

        let mut alive = true;
        for file in self.pending.drain() {
            debug!(queued = %file.queued.display(), "adding file to printer queue");
            if let Err(e) = link.sender.send(file) {
                error!(error = %e, "cannot hand file to print worker");
                alive = false;
            }
        }
        alive
    }

    fn transition(&mut self, to: ServiceState) {
        debug!(from = %self.state, to = %to, "state transition");
        self.state = to;
    }
}

/// Create `path` (and parents) if it does not exist yet.
fn ensure_dir(path: &Path, mode: u32) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    debug!(path = %path.display(), "directory missing, creating");

    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;

    builder.create(path).map_err(|source| SpoolError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}
