// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pending buffer: documents already moved into the queue directory but not
// yet handed to the print worker.  Owned by the service loop alone.

use std::collections::VecDeque;

use tracing::warn;

use spoolwerk_core::types::SpoolFile;

#[derive(Debug, Default)]
pub struct PendingBuffer {
    items: VecDeque<SpoolFile>,
}

impl PendingBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append documents in discovery order.  A queue path that is already
    /// buffered is dropped so it can never reach the worker twice.
    pub fn extend(&mut self, files: impl IntoIterator<Item = SpoolFile>) {
        for file in files {
            if self.items.iter().any(|f| f.queued == file.queued) {
                warn!(queued = %file.queued.display(), "already pending, not buffering twice");
                continue;
            }
            self.items.push_back(file);
        }
    }

    /// Empty the buffer, oldest first.
    pub fn drain(&mut self) -> impl Iterator<Item = SpoolFile> + '_ {
        self.items.drain(..)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
