// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// IPP backend: hands spooled documents to a network or CUPS printer.
//
// Uses the `ipp` crate's async API for the two operations the spooler needs:
//   - Get-Printer-Attributes  (RFC 8011 §4.2.5), once at startup
//   - Print-Job               (RFC 8011 §4.2.1), once per document
//
// A local CUPS queue is reachable as `ipp://localhost:631/printers/<name>`.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

use ipp::prelude::*;
use sha2::{Digest, Sha256};
use tracing::{debug, error, info, instrument, warn};

use spoolwerk_core::error::{Result, SpoolError};
use spoolwerk_core::types::DocumentType;

use crate::backend::PrintBackend;

/// Attributes returned by a Get-Printer-Attributes response, flattened to
/// attribute-name → display string.
pub type PrinterAttributes = HashMap<String, String>;

/// Async IPP client bound to a single printer URI.
pub struct IppClient {
    uri: Uri,
}

impl IppClient {
    /// Create a client for an `ipp://` or `ipps://` printer URI.
    pub fn new(uri: &str) -> Result<Self> {
        let parsed: Uri = uri
            .parse()
            .map_err(|e| SpoolError::Config(format!("invalid printer URI '{uri}': {e}")))?;
        Ok(Self { uri: parsed })
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Query the printer for its capabilities and current state.
    #[instrument(skip(self), fields(uri = %self.uri))]
    pub async fn get_printer_attributes(&self) -> Result<PrinterAttributes> {
        let operation = IppOperationBuilder::get_printer_attributes(self.uri.clone()).build();
        let client = AsyncIppClient::new(self.uri.clone());

        debug!("sending Get-Printer-Attributes");
        let response = client
            .send(operation)
            .await
            .map_err(|e| SpoolError::IppRequest(format!("Get-Printer-Attributes: {e}")))?;

        if !response.header().status_code().is_success() {
            let code = response.header().status_code();
            error!(status = ?code, "Get-Printer-Attributes failed");
            return Err(SpoolError::IppRequest(format!(
                "Get-Printer-Attributes returned status {code:?}"
            )));
        }

        Ok(flatten_attributes(response.attributes()))
    }

    /// Submit a document as a Print-Job.  Returns the printer's job-id.
    #[instrument(skip(self, document_bytes), fields(uri = %self.uri, job_name = %job_name))]
    pub async fn print_job(
        &self,
        document_bytes: Vec<u8>,
        document_type: DocumentType,
        job_name: &str,
    ) -> Result<i32> {
        let payload = IppPayload::new(Cursor::new(document_bytes));

        let operation = IppOperationBuilder::print_job(self.uri.clone(), payload)
            .job_title(job_name)
            .document_format(document_type.mime_type())
            .build();

        let client = AsyncIppClient::new(self.uri.clone());

        debug!(mime = document_type.mime_type(), "sending Print-Job");
        let response = client
            .send(operation)
            .await
            .map_err(|e| SpoolError::IppRequest(format!("Print-Job: {e}")))?;

        if !response.header().status_code().is_success() {
            let code = response.header().status_code();
            error!(status = ?code, "Print-Job failed");
            return Err(SpoolError::IppRequest(format!(
                "Print-Job returned status {code:?}"
            )));
        }

        extract_job_id(response.attributes()).ok_or_else(|| {
            SpoolError::IppRequest("Print-Job response missing job-id attribute".into())
        })
    }
}

/// Print backend that sends each document to an IPP printer.
pub struct IppBackend {
    client: IppClient,
}

impl IppBackend {
    pub fn new(uri: &str) -> Result<Self> {
        Ok(Self {
            client: IppClient::new(uri)?,
        })
    }

    /// Log which printer jobs will go to.  Failure is only a warning: the
    /// printer may come up later, and each job reports its own error.
    pub async fn probe(&self) {
        match self.client.get_printer_attributes().await {
            Ok(attrs) => {
                let name = attrs.get("printer-name").map(String::as_str).unwrap_or("unknown");
                let model = attrs
                    .get("printer-make-and-model")
                    .map(String::as_str)
                    .unwrap_or("unknown");
                info!(uri = %self.client.uri(), printer = name, model, "printer reachable");
            }
            Err(e) => {
                warn!(uri = %self.client.uri(), error = %e, "printer not reachable at startup");
            }
        }
    }
}

impl PrintBackend for IppBackend {
    fn name(&self) -> &str {
        "ipp"
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    async fn submit(&self, path: &Path) -> Result<()> {
        let document_type = DocumentType::from_path(path)
            .ok_or_else(|| SpoolError::UnsupportedDocument(path.display().to_string()))?;
        let job_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "spoolwerk job".into());

        let bytes = tokio::fs::read(path).await?;
        let digest = document_digest(&bytes);
        debug!(bytes = bytes.len(), sha256 = %digest, "document read");

        let job_id = self.client.print_job(bytes, document_type, &job_name).await?;
        info!(job_id, sha256 = %digest, "print job accepted by printer");
        Ok(())
    }
}

/// SHA-256 of the document bytes as lowercase hex, logged with each job so a
/// printout can be matched to the file that produced it.
fn document_digest(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Flatten all attribute groups in an IPP response into a single map.
fn flatten_attributes(attrs: &IppAttributes) -> PrinterAttributes {
    let mut map = HashMap::new();
    for group in attrs.groups() {
        for (name, attr) in group.attributes() {
            map.insert(name.clone(), format!("{}", attr.value()));
        }
    }
    map
}

/// Extract the `job-id` integer from a response's Job Attributes group.
fn extract_job_id(attrs: &IppAttributes) -> Option<i32> {
    for group in attrs.groups_of(DelimiterTag::JobAttributes) {
        if let Some(attr) = group.attributes().get("job-id")
            && let IppValue::Integer(id) = attr.value()
        {
            return Some(*id);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_invalid_uri() {
        assert!(matches!(
            IppClient::new("not a valid uri %%%"),
            Err(SpoolError::Config(_))
        ));
    }

    #[test]
    fn new_accepts_cups_queue_uri() {
        let client = IppClient::new("ipp://localhost:631/printers/office").expect("uri");
        assert_eq!(client.uri().path(), "/printers/office");
    }

    #[test]
    fn digest_is_sha256_hex() {
        assert_eq!(
            document_digest(b"hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[tokio::test]
    async fn submit_rejects_unknown_extension_before_network() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("slides.pptx");
        std::fs::write(&path, b"x").expect("write");

        let backend = IppBackend::new("ipp://127.0.0.1:1/ipp/print").expect("backend");
        assert!(matches!(
            backend.submit(&path).await,
            Err(SpoolError::UnsupportedDocument(_))
        ));
    }

    #[tokio::test]
    async fn submit_reports_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = IppBackend::new("ipp://127.0.0.1:1/ipp/print").expect("backend");
        assert!(matches!(
            backend.submit(&dir.path().join("gone.pdf")).await,
            Err(SpoolError::Io(_))
        ));
    }
}
