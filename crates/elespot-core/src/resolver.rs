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

//! Checkpoint Resolver: finds where the previous runs left off.

use chrono::{DateTime, Duration, Utc};
use tracing::{Instrument, Span, debug, info};

use crate::error::{Result, SyncError};
use crate::traits::{CheckpointQuery, StoredRecord, TimeSeriesStore};
use elespot_types::{Checkpoint, SeriesKey};

#[derive(Debug, Clone)]
pub struct CheckpointResolver {
    lookback: Duration,
    span: Span,
}

impl CheckpointResolver {
    pub fn new(lookback: Duration, span: Span) -> Self {
        Self { lookback, span }
    }

    /// Most recent stored observation for `key` within the lookback window
    /// ending at `now`, or `Checkpoint::Absent` if there is none.
    ///
    /// Read-only. Store errors are returned as-is; a scanned row without a
    /// timestamp is a `DataIntegrity` error.
    pub async fn resolve<S>(&self, store: &S, key: &SeriesKey, now: DateTime<Utc>) -> Result<Checkpoint>
    where
        S: TimeSeriesStore + ?Sized,
    {
        let query = CheckpointQuery::spot_prices(key, now - self.lookback);

        async move {
            debug!(
                store = store.name(),
                series = %query.series,
                since = %query.since.to_rfc3339(),
                "Scanning for last stored observation"
            );

            let records = store.scan_latest(&query).await?;
            let checkpoint = latest(&records)?;

            match checkpoint {
                Checkpoint::Absent => info!("No stored observations within lookback, starting fresh"),
                Checkpoint::At(t) => info!(checkpoint = %t.to_rfc3339(), "Resuming after last stored observation"),
            }
            Ok::<_, SyncError>(checkpoint)
        }
        .instrument(self.span.clone())
        .await
    }
}

/// Highest timestamp among the scanned rows.
fn latest(records: &[StoredRecord]) -> Result<Checkpoint> {
    let mut newest: Option<DateTime<Utc>> = None;

    for record in records {
        let time = record.time.ok_or_else(|| {
            SyncError::DataIntegrity("stored record has no timestamp".to_owned())
        })?;
        debug!(time = %time.to_rfc3339(), value = ?record.value, "Stored record");
        newest = Some(newest.map_or(time, |n| n.max(time)));
    }

    Ok(newest.into())
}
