// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of elespot.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

mod config;
mod logging;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use elespot_adapters::{EntsoeClient, InfluxStore};
use elespot_core::{IncrementalSync, SyncOutcome};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{Span, info, info_span, warn};

use crate::config::{AppConfig, DEFAULT_CONFIG_PATH};

#[derive(Parser)]
#[command(name = "elespot")]
#[command(about = "Sync ENTSO-E day-ahead spot prices into InfluxDB", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Fetch prices and report them without writing
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::from_file(&cli.config)?;

    let _log_guard = tracing::subscriber::set_default(logging::subscriber(&config.debug.verbosity));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(run(&config, cli.dry_run))
}

async fn run(config: &AppConfig, dry_run: bool) -> Result<()> {
    let key = config.series_key()?;
    let span = info_span!("sync", location = key.code());

    let store = InfluxStore::new(
        &config.influx2.url,
        &config.influx2.token,
        &config.influx2.org,
        &config.influx2.bucket,
        Duration::from_secs(config.influx2.timeout_secs),
    )
    .context("Failed to set up InfluxDB client")?;
    let source = EntsoeClient::new(
        &config.entsoe.api_url,
        &config.entsoe.entsoe_api_key,
        Duration::from_secs(config.entsoe.timeout_secs),
    )
    .context("Failed to set up ENTSO-E client")?;

    info!(parent: &span, "Syncing {} prices into bucket {}", key, store.bucket());

    let outcome = IncrementalSync::new(store, source, key, config.horizons(), span.clone())
        .dry_run(dry_run)
        .run(Utc::now())
        .await
        .context("Sync failed")?;

    report(&span, &outcome);
    Ok(())
}

fn report(span: &Span, outcome: &SyncOutcome) {
    match outcome {
        SyncOutcome::UpToDate { checkpoint } => {
            info!(parent: span, %checkpoint, "Nothing to fetch");
        }
        SyncOutcome::NothingNew { window } => {
            info!(parent: span, %window, "No new prices published");
        }
        SyncOutcome::DryRun { window, fetched } => {
            info!(parent: span, %window, fetched, "Dry run finished, nothing written");
        }
        SyncOutcome::Written { window, report } => {
            info!(
                parent: span,
                %window,
                submitted = report.submitted,
                succeeded = report.succeeded,
                rejected = report.rejected,
                "Sync finished"
            );
            if !report.is_complete() {
                warn!(
                    parent: span,
                    shortfall = report.shortfall(),
                    "Not every hour was stored, the next run resumes from the last stored one"
                );
            }
        }
    }
}
