// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Spoolwerk — hot-folder print spooler.
//
// Entry point.  Parses arguments (before touching any directory), initialises
// logging, picks the print backend and runs the spool service until a
// `terminate` file shows up in the inbox.
//
// Exit codes: 0 on help or clean shutdown, 2 on bad arguments or config,
// 1 when the service itself fails.

mod cli;

use std::process::ExitCode;

use clap::Parser;

use spoolwerk_print::Backend;
use spoolwerk_spool::SpoolService;

use cli::Cli;

const EXIT_USAGE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    // Help exits 0, malformed flags exit 2.
    let cli = Cli::parse();

    let config = match cli.into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("spoolwerk: {e}");
            return ExitCode::from(EXIT_USAGE);
        }
    };

    let default_level = if config.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Spoolwerk starting");
    tracing::debug!(?config, "configuration finished");

    let backend = match Backend::from_config(&config).await {
        Ok(backend) => backend,
        Err(e) => {
            tracing::error!(error = %e, "cannot set up print backend");
            return ExitCode::from(EXIT_USAGE);
        }
    };

    match SpoolService::new(config, backend).run().await {
        Ok(report) => {
            tracing::info!(
                printed = report.printed,
                failed = report.failed,
                "Spoolwerk stopped"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "spool service failed");
            ExitCode::FAILURE
        }
    }
}
