// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Spoolwerk Spool — hot-folder spooling.
//
// One producer and one consumer:
//
//   inbox ──scan/rename──▶ queue dir ──PendingBuffer──▶ WorkChannel ──▶ PrintWorker
//
// The service loop (producer) owns the scanner and the pending buffer; the
// print worker (consumer) owns the receiving end of the work channel and the
// print backend.  They share nothing else.  Shutdown is triggered by a
// `terminate` file in the inbox and drains every queued document before the
// queue directory is removed.

pub mod channel;
pub mod pending;
pub mod scanner;
pub mod service;
pub mod shutdown;
pub mod worker;

#[cfg(test)]
mod testing;

pub use channel::{WorkReceiver, WorkSender, work_channel};
pub use pending::PendingBuffer;
pub use scanner::{InboxScanner, ScanOutcome};
pub use service::{ServiceLoop, SpoolService};
pub use shutdown::ShutdownCoordinator;
pub use worker::{PrintWorker, WorkerHandle};
