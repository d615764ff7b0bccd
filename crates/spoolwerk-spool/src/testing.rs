// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Backend double shared by the unit tests in this crate.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tokio::sync::Semaphore;

use spoolwerk_core::error::{Result, SpoolError};
use spoolwerk_print::PrintBackend;

#[derive(Debug, Clone)]
pub struct Submission {
    pub path: PathBuf,
    /// Whether the document was still on disk when it was submitted.
    pub present: bool,
}

/// Records every submission; can be told to fail, to panic, or to hold each
/// job until the test releases a permit.
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    submissions: Arc<Mutex<Vec<Submission>>>,
    completed: Arc<Mutex<usize>>,
    fail: bool,
    panic: bool,
    gate: Option<Arc<Semaphore>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Takes the worker task down on the first submission.
    pub fn panicking() -> Self {
        Self {
            panic: true,
            ..Self::default()
        }
    }

    /// Each submission waits for one permit from `gate`.
    pub fn gated(gate: Arc<Semaphore>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().expect("submissions lock poisoned").clone()
    }

    pub fn submitted(&self) -> Vec<PathBuf> {
        self.submissions().into_iter().map(|s| s.path).collect()
    }

    pub fn completed(&self) -> usize {
        *self.completed.lock().expect("completed lock poisoned")
    }
}

impl PrintBackend for RecordingBackend {
    fn name(&self) -> &str {
        "recording"
    }

    async fn submit(&self, path: &Path) -> Result<()> {
        self.submissions
            .lock()
            .expect("submissions lock poisoned")
            .push(Submission {
                path: path.to_path_buf(),
                present: path.exists(),
            });
        if self.panic {
            panic!("printer driver crashed on {}", path.display());
        }

        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| SpoolError::IppRequest(format!("gate closed: {e}")))?
                .forget();
        }

        *self.completed.lock().expect("completed lock poisoned") += 1;
        if self.fail {
            return Err(SpoolError::IppRequest("printer stopped: paper-jam".into()));
        }
        Ok(())
    }
}
