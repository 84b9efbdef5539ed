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

//! Ingestion Writer: persists a fetched series point by point.

use tracing::{Instrument, Span, debug, error, info, warn};

use crate::error::{Result, SyncError};
use crate::traits::TimeSeriesStore;
use elespot_types::{Point, Series, SeriesKey};

/// Per-run write accounting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteReport {
    pub submitted: usize,
    pub succeeded: usize,
    pub rejected: usize,
}

impl WriteReport {
    /// Points submitted but not acknowledged
    pub fn shortfall(&self) -> usize {
        self.submitted - self.succeeded
    }

    pub fn is_complete(&self) -> bool {
        self.shortfall() == 0
    }
}

#[derive(Debug, Clone)]
pub struct IngestionWriter {
    span: Span,
}

impl IngestionWriter {
    pub fn new(span: Span) -> Self {
        Self { span }
    }

    /// Write every observation in ascending time order, one call each.
    ///
    /// A rejected point is counted and skipped. Any other store error aborts
    /// the remaining writes and is returned.
    pub async fn write<S>(&self, store: &S, key: &SeriesKey, series: &Series) -> Result<WriteReport>
    where
        S: TimeSeriesStore + ?Sized,
    {
        async move {
            let mut report = WriteReport::default();

            for observation in series {
                let point = Point::spot_price(key, observation);
                report.submitted += 1;

                match store.write_point(&point).await {
                    Ok(()) => {
                        report.succeeded += 1;
                        debug!(time = %point.time.to_rfc3339(), value = point.value, "Point stored");
                    }
                    Err(e) if !e.is_fatal() => {
                        report.rejected += 1;
                        warn!(time = %point.time.to_rfc3339(), error = %e, "Point rejected by store");
                    }
                    Err(e) => {
                        error!(
                            succeeded = report.succeeded,
                            remaining = series.len() - report.submitted,
                            "Lost store connection while writing, aborting run"
                        );
                        return Err(e);
                    }
                }
            }

            info!("Succeeded to send {} hours", report.succeeded);
            Ok::<_, SyncError>(report)
        }
        .instrument(self.span.clone())
        .await
    }
}
