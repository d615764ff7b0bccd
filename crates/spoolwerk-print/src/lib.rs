// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Spoolwerk Print — Print backends.
//
// A backend takes the path of a queued document and reports whether the
// printer accepted it; removing the file afterwards is the worker's job.

pub mod backend;
pub mod ipp_client;
pub mod mockup;

pub use backend::{Backend, PrintBackend};
pub use ipp_client::{IppBackend, IppClient};
pub use mockup::MockupBackend;
