// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Spooler configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpoolError};
use crate::types::{DocumentType, QUEUE_DIR_NAME};

/// Default inbox root on the print share.
pub const DEFAULT_ROOT: &str = "/share/print";

/// Default and minimum poll interval, in seconds.
pub const DEFAULT_POLL_SECS: u64 = 1;

/// Service settings, loadable from a JSON file and overridable from the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpoolConfig {
    /// Inbox directory watched for documents.
    pub root: PathBuf,
    /// Seconds to sleep between inbox scans.
    pub poll_interval_secs: u64,
    /// Log every file movement and state transition.
    pub verbose: bool,
    /// Which documents this deployment prints.
    pub document_type: DocumentType,
    /// Mode for directories created on startup (unix only, umask applies).
    pub dir_mode: u32,
    /// IPP printer URI; the mockup backend is used when absent.
    pub printer_uri: Option<String>,
}

impl Default for SpoolConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
            poll_interval_secs: DEFAULT_POLL_SECS,
            verbose: false,
            document_type: DocumentType::Pdf,
            dir_mode: 0o777,
            printer_uri: None,
        }
    }
}

impl SpoolConfig {
    /// Read a JSON config file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| SpoolError::Config(format!("read {}: {e}", path.display())))?;
        let mut config: Self = serde_json::from_str(&data)?;
        if config.poll_interval_secs < DEFAULT_POLL_SECS {
            config.poll_interval_secs = DEFAULT_POLL_SECS;
        }
        Ok(config)
    }

    /// Config rooted at `root` with every other field defaulted.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// The internal queue directory, `<root>/queue`.
    pub fn queue_dir(&self) -> PathBuf {
        self.root.join(QUEUE_DIR_NAME)
    }

    /// The recognised document suffix, e.g. `.pdf`.
    pub fn extension(&self) -> &'static str {
        self.document_type.extension()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

/// Turn a raw `--time` argument into a poll interval in seconds.
///
/// Anything that is not a plain run of decimal digits, or is below one
/// second, becomes the default of one second.
pub fn coerce_poll_secs(raw: &str) -> u64 {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return DEFAULT_POLL_SECS;
    }
    match raw.parse::<u64>() {
        Ok(secs) if secs >= DEFAULT_POLL_SECS => secs,
        _ => DEFAULT_POLL_SECS,
    }
}
