// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Spoolwerk spooler.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name of the zero-byte file that asks the service to drain and exit.
pub const TERMINATION_MARKER: &str = "terminate";

/// Name of the working directory created inside the inbox root.
pub const QUEUE_DIR_NAME: &str = "queue";

/// Correlation identifier for a spooled document, used in log spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Document kinds the spooler can be deployed for.
///
/// Each deployment watches for exactly one kind; the extension match is
/// case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    #[default]
    Pdf,
    #[serde(rename = "txt")]
    PlainText,
}

impl DocumentType {
    /// MIME type string for IPP `document-format`.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::PlainText => "text/plain",
        }
    }

    /// File-name suffix (including the dot) recognised in the inbox.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => ".pdf",
            Self::PlainText => ".txt",
        }
    }

    /// Infer document type from a bare extension (`"pdf"`, `"txt"`).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "pdf" => Some(Self::Pdf),
            "txt" => Some(Self::PlainText),
            _ => None,
        }
    }

    /// Infer document type from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Whether `file_name` carries this type's suffix.
    pub fn matches(&self, file_name: &str) -> bool {
        file_name.ends_with(self.extension())
    }
}

/// A document that has been moved from the inbox into the queue directory.
///
/// Once constructed the file is only reachable through `queued`; `origin` is
/// kept for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpoolFile {
    pub id: JobId,
    /// Bare file name, e.g. `report.pdf`.
    pub name: String,
    /// Where the document was found in the inbox.
    pub origin: PathBuf,
    /// Where the document lives now.
    pub queued: PathBuf,
    pub discovered_at: DateTime<Utc>,
}

impl SpoolFile {
    pub fn new(name: impl Into<String>, origin: PathBuf, queued: PathBuf) -> Self {
        Self {
            id: JobId::new(),
            name: name.into(),
            origin,
            queued,
            discovered_at: Utc::now(),
        }
    }
}

/// An item travelling from the service loop to the print worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkItem {
    /// A queued document to print and delete.
    File(SpoolFile),
    /// No more work; the worker exits when it sees this.
    Shutdown,
}

/// Lifecycle states of the service loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceState {
    /// Scanning the inbox every tick.
    Running,
    /// Marker seen; waiting for queued work to finish.
    Draining,
    /// Worker stopped and the queue directory reclaimed.
    Terminated,
}

impl std::fmt::Display for ServiceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Terminated => "terminated",
        };
        f.write_str(label)
    }
}

/// Tally kept by the print worker and returned when it exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerReport {
    /// Submissions the backend accepted.
    pub printed: u64,
    /// Submissions the backend rejected (the file was still removed).
    pub failed: u64,
    /// Files that could not be removed after submission.
    pub cleanup_failures: u64,
}

impl WorkerReport {
    /// Total documents the worker attempted.
    pub fn attempted(&self) -> u64 {
        self.printed + self.failed
    }
}
