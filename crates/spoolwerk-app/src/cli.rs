// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line surface.  Flags override values from the optional JSON config
// file, which in turn overrides the built-in defaults.

use std::convert::Infallible;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use spoolwerk_core::config::coerce_poll_secs;
use spoolwerk_core::error::Result;
use spoolwerk_core::{DocumentType, SpoolConfig};

#[derive(Debug, Parser)]
#[command(
    name = "spoolwerk",
    version,
    about = "Hot-folder print spooler",
    long_about = "Spoolwerk watches an inbox directory, moves finished documents into \
                  <inbox>/queue and prints them one at a time, deleting each file \
                  afterwards.\n\n\
                  Create a file named `terminate` in the inbox to print whatever is \
                  still queued and exit."
)]
pub struct Cli {
    /// Seconds between inbox scans (anything not a positive whole number means 1)
    #[arg(
        short = 't',
        long = "time",
        value_name = "SECONDS",
        allow_hyphen_values = true,
        value_parser = parse_poll_secs
    )]
    pub time: Option<u64>,

    /// Log every file movement and state transition
    #[arg(short, long)]
    pub verbose: bool,

    /// Inbox directory to watch [default: /share/print]
    #[arg(short, long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Document type this deployment prints [default: pdf]
    #[arg(short, long, value_enum)]
    pub extension: Option<Extension>,

    /// IPP printer URI, e.g. ipp://localhost:631/printers/office (mockup printing when absent)
    #[arg(short, long, value_name = "URI")]
    pub printer: Option<String>,

    /// JSON configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Extension {
    Pdf,
    Txt,
}

impl From<Extension> for DocumentType {
    fn from(ext: Extension) -> Self {
        match ext {
            Extension::Pdf => DocumentType::Pdf,
            Extension::Txt => DocumentType::PlainText,
        }
    }
}

fn parse_poll_secs(raw: &str) -> std::result::Result<u64, Infallible> {
    Ok(coerce_poll_secs(raw))
}

impl Cli {
    /// Resolve the effective configuration.
    pub fn into_config(self) -> Result<SpoolConfig> {
        let mut config = match &self.config {
            Some(path) => SpoolConfig::load(path)?,
            None => SpoolConfig::default(),
        };

        if let Some(secs) = self.time {
            config.poll_interval_secs = secs;
        }
        if self.verbose {
            config.verbose = true;
        }
        if let Some(root) = self.root {
            config.root = root;
        }
        if let Some(ext) = self.extension {
            config.document_type = ext.into();
        }
        if let Some(uri) = self.printer {
            config.printer_uri = Some(uri);
        }
        Ok(config)
    }
}
