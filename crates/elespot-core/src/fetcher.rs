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

//! Price Fetcher: computes the query window and pulls prices for it.

use chrono::{DateTime, Utc};
use tracing::{Instrument, Span, debug, info};

use crate::error::{Result, SyncError};
use crate::traits::PriceSource;
use elespot_types::{Checkpoint, Horizons, QueryWindow, Series, SeriesKey};

#[derive(Debug, Clone)]
pub struct PriceFetcher {
    horizons: Horizons,
    span: Span,
}

impl PriceFetcher {
    pub fn new(horizons: Horizons, span: Span) -> Self {
        Self { horizons, span }
    }

    /// Window to request after `checkpoint`; `None` if there is nothing left
    /// to ask for before the forward horizon.
    pub fn window(&self, checkpoint: Checkpoint, key: &SeriesKey, now: DateTime<Utc>) -> Option<QueryWindow> {
        QueryWindow::for_run(checkpoint, now, key.timezone(), &self.horizons)
    }

    /// Fetch everything published after `checkpoint`.
    pub async fn fetch<P>(
        &self,
        source: &P,
        checkpoint: Checkpoint,
        key: &SeriesKey,
        now: DateTime<Utc>,
    ) -> Result<Series>
    where
        P: PriceSource + ?Sized,
    {
        match self.window(checkpoint, key, now) {
            Some(window) => self.fetch_window(source, key, &window).await,
            None => {
                debug!(parent: &self.span, %checkpoint, "Checkpoint is past the forward horizon, nothing to fetch");
                Ok(Series::empty())
            }
        }
    }

    /// One source call for `window`. The result is limited to the window.
    ///
    /// Source failures are returned as-is; there is no retry here.
    pub async fn fetch_window<P>(&self, source: &P, key: &SeriesKey, window: &QueryWindow) -> Result<Series>
    where
        P: PriceSource + ?Sized,
    {
        let zone = key.timezone();

        async move {
            info!(
                source = source.name(),
                start = %window.start_in(zone).to_rfc3339(),
                end = %window.end_in(zone).to_rfc3339(),
                "Requesting day-ahead prices"
            );

            let series = source
                .day_ahead_prices(key, window)
                .await?
                .truncate_to(window);

            debug!("Received data for {} hours", series.len());
            Ok::<_, SyncError>(series)
        }
        .instrument(self.span.clone())
        .await
    }
}
