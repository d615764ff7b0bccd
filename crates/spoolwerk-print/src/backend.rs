// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The print capability seam.
//
// The worker only needs `submit(path) -> ok | error`.  Which backend answers
// is decided once at startup from the configuration: an IPP printer when a
// URI is configured, the mockup otherwise.

use std::future::Future;
use std::path::Path;

use tracing::info;

use spoolwerk_core::SpoolConfig;
use spoolwerk_core::error::Result;

use crate::ipp_client::IppBackend;
use crate::mockup::MockupBackend;

/// Something that can print a document sitting on local disk.
///
/// Implementations must not delete or move the file.  There is no retry: an
/// `Err` is final for that document.
pub trait PrintBackend: Send + Sync + 'static {
    /// Short label for log lines.
    fn name(&self) -> &str;

    /// Submit the document at `path`.  Resolves once the printer has accepted
    /// or rejected it.
    fn submit(&self, path: &Path) -> impl Future<Output = Result<()>> + Send;
}

/// The backend chosen from configuration.
pub enum Backend {
    Mockup(MockupBackend),
    Ipp(IppBackend),
}

impl Backend {
    /// Build the backend described by `config`.
    ///
    /// For IPP the printer is probed once so its name shows up in the log; an
    /// unreachable printer is reported but does not stop the service.
    pub async fn from_config(config: &SpoolConfig) -> Result<Self> {
        match config.printer_uri.as_deref() {
            None => {
                info!("no printer configured, using mockup backend");
                Ok(Self::Mockup(MockupBackend))
            }
            Some(uri) => {
                let backend = IppBackend::new(uri)?;
                backend.probe().await;
                Ok(Self::Ipp(backend))
            }
        }
    }
}

impl PrintBackend for Backend {
    fn name(&self) -> &str {
        match self {
            Self::Mockup(b) => b.name(),
            Self::Ipp(b) => b.name(),
        }
    }

    async fn submit(&self, path: &Path) -> Result<()> {
        match self {
            Self::Mockup(b) => b.submit(path).await,
            Self::Ipp(b) => b.submit(path).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_printer_uri_selects_mockup() {
        let backend = Backend::from_config(&SpoolConfig::default())
            .await
            .expect("backend");
        assert!(matches!(backend, Backend::Mockup(_)));
        assert_eq!(backend.name(), "mockup");
    }

    #[tokio::test]
    async fn invalid_printer_uri_is_rejected() {
        let config = SpoolConfig {
            printer_uri: Some("not a valid uri %%%".into()),
            ..SpoolConfig::default()
        };
        assert!(Backend::from_config(&config).await.is_err());
    }

    #[tokio::test]
    async fn dispatch_reaches_selected_backend() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("a.pdf");
        std::fs::write(&path, b"%PDF-1.4").expect("write");

        let backend = Backend::Mockup(MockupBackend);
        backend.submit(&path).await.expect("submit");
        assert!(backend.submit(&dir.path().join("missing.pdf")).await.is_err());
    }
}
