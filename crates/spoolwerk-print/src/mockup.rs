// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Mockup backend for deployments without a printer attached.

use std::path::Path;

use tracing::{info, instrument};

use spoolwerk_core::error::Result;

use crate::backend::PrintBackend;

/// Logs each document instead of printing it.
///
/// The document must still exist and be readable, so a vanished file shows up
/// as a failed submission exactly as it would with a real printer.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockupBackend;

impl PrintBackend for MockupBackend {
    fn name(&self) -> &str {
        "mockup"
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    async fn submit(&self, path: &Path) -> Result<()> {
        let meta = tokio::fs::metadata(path).await?;
        info!(bytes = meta.len(), "mockup printing");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn accepts_existing_document() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("report.txt");
        std::fs::write(&path, b"hello").expect("write");

        MockupBackend.submit(&path).await.expect("submit");
        // The backend never removes the file itself.
        assert!(path.exists());
    }

    #[tokio::test]
    async fn rejects_missing_document() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = MockupBackend.submit(&dir.path().join("gone.txt")).await;
        assert!(result.is_err());
    }
}
