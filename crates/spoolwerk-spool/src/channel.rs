// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Work channel between the service loop (sole producer) and the print worker
// (sole consumer).
//
// An unbounded tokio mpsc queue plus an outstanding-work counter.  The
// counter goes up on every send and down when the worker acknowledges a
// finished document; `wait_idle` is the drain barrier the shutdown protocol
// waits on.  Sending the shutdown sentinel consumes the sender, so the
// sentinel is always the last item and can be sent at most once.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{Notify, mpsc};
use tracing::trace;

use spoolwerk_core::error::{Result, SpoolError};
use spoolwerk_core::types::{SpoolFile, WorkItem};

#[derive(Debug, Default)]
struct Outstanding {
    count: AtomicUsize,
    idle: Notify,
}

/// Create a connected sender/receiver pair.
pub fn work_channel() -> (WorkSender, WorkReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    let outstanding = Arc::new(Outstanding::default());
    (
        WorkSender {
            tx,
            outstanding: Arc::clone(&outstanding),
        },
        WorkReceiver { rx, outstanding },
    )
}

/// Producer half, held by the service loop.
#[derive(Debug)]
pub struct WorkSender {
    tx: mpsc::UnboundedSender<WorkItem>,
    outstanding: Arc<Outstanding>,
}

impl WorkSender {
    /// Queue a document for the worker.  Never blocks.
    ///
    /// Fails only when the worker has gone away.
    pub fn send(&self, file: SpoolFile) -> Result<()> {
        self.outstanding.count.fetch_add(1, Ordering::AcqRel);
        if self.tx.send(WorkItem::File(file)).is_err() {
            self.release();
            return Err(SpoolError::ChannelClosed);
        }
        Ok(())
    }

    /// Documents sent but not yet acknowledged by the worker.
    pub fn outstanding(&self) -> usize {
        self.outstanding.count.load(Ordering::Acquire)
    }

    /// Resolve once every sent document has been acknowledged.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.outstanding.idle.notified();
            tokio::pin!(notified);
            // Register before checking so an ack between the check and the
            // await is not missed.
            notified.as_mut().enable();
            if self.outstanding() == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Send the shutdown sentinel.  Consumes the sender: nothing can follow.
    pub fn send_shutdown(self) -> Result<()> {
        trace!("sending shutdown sentinel");
        self.tx
            .send(WorkItem::Shutdown)
            .map_err(|_| SpoolError::ChannelClosed)
    }

    fn release(&self) {
        release(&self.outstanding);
    }
}

/// Consumer half, owned by the print worker.
#[derive(Debug)]
pub struct WorkReceiver {
    rx: mpsc::UnboundedReceiver<WorkItem>,
    outstanding: Arc<Outstanding>,
}

impl WorkReceiver {
    /// Wait for the next item.  `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<WorkItem> {
        self.rx.recv().await
    }

    /// Mark one received document as fully processed.
    pub fn ack(&self) {
        release(&self.outstanding);
    }
}

fn release(outstanding: &Outstanding) {
    let previous = outstanding.count.fetch_sub(1, Ordering::AcqRel);
    debug_assert!(previous > 0, "acknowledged more work than was sent");
    if previous == 1 {
        outstanding.idle.notify_waiters();
    }
}
