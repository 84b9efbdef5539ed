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

//! One incremental sync run: Resolver -> Fetcher -> Writer.

use chrono::{DateTime, Utc};
use tracing::{Instrument, Span, info, info_span};

use crate::error::{Result, SyncError};
use crate::fetcher::PriceFetcher;
use crate::resolver::CheckpointResolver;
use crate::traits::{PriceSource, TimeSeriesStore};
use crate::writer::{IngestionWriter, WriteReport};
use elespot_types::{Checkpoint, Horizons, QueryWindow, SeriesKey};

/// How a run ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The checkpoint already reaches the forward horizon
    UpToDate { checkpoint: Checkpoint },
    /// The source had no observations for the window
    NothingNew { window: QueryWindow },
    /// Fetched but not written (`dry_run`)
    DryRun { window: QueryWindow, fetched: usize },
    Written { window: QueryWindow, report: WriteReport },
}

impl SyncOutcome {
    /// Points the store acknowledged during the run
    pub fn success_count(&self) -> usize {
        match self {
            Self::Written { report, .. } => report.succeeded,
            Self::UpToDate { .. } | Self::NothingNew { .. } | Self::DryRun { .. } => 0,
        }
    }
}

/// A configured run against one store and one price source for one series.
///
/// `run` consumes the value, so both clients are released when the run ends
/// on any path.
#[derive(Debug)]
pub struct IncrementalSync<S, P> {
    store: S,
    source: P,
    key: SeriesKey,
    horizons: Horizons,
    dry_run: bool,
    span: Span,
}

impl<S, P> IncrementalSync<S, P>
where
    S: TimeSeriesStore,
    P: PriceSource,
{
    pub fn new(store: S, source: P, key: SeriesKey, horizons: Horizons, span: Span) -> Self {
        Self {
            store,
            source,
            key,
            horizons,
            dry_run: false,
            span,
        }
    }

    /// Resolve and fetch only; nothing is written.
    #[must_use]
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    pub async fn run(self, now: DateTime<Utc>) -> Result<SyncOutcome> {
        let Self {
            store,
            source,
            key,
            horizons,
            dry_run,
            span,
        } = self;

        let resolver = CheckpointResolver::new(horizons.lookback, info_span!(parent: &span, "resolve"));
        let fetcher = PriceFetcher::new(horizons, info_span!(parent: &span, "fetch"));
        let writer = IngestionWriter::new(info_span!(parent: &span, "write"));

        async move {
            let checkpoint = resolver.resolve(&store, &key, now).await?;

            let Some(window) = fetcher.window(checkpoint, &key, now) else {
                info!(%checkpoint, "Already up to date");
                return Ok(SyncOutcome::UpToDate { checkpoint });
            };

            let series = fetcher.fetch_window(&source, &key, &window).await?;
            if series.is_empty() {
                info!(%window, "No data received, exiting");
                return Ok(SyncOutcome::NothingNew { window });
            }

            if dry_run {
                info!(fetched = series.len(), "Dry run, skipping writes");
                return Ok(SyncOutcome::DryRun {
                    window,
                    fetched: series.len(),
                });
            }

            let report = writer.write(&store, &key, &series).await?;
            Ok::<_, SyncError>(SyncOutcome::Written { window, report })
        }
        .instrument(span.clone())
        .await
    }
}
