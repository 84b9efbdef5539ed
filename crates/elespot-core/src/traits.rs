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

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use elespot_types::{FIELD, MEASUREMENT, Point, QueryWindow, Series, SeriesKey};

/// Row returned by a checkpoint scan.
///
/// Fields are optional because the store response is not trusted to carry
/// them; the resolver decides what a missing field means.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub time: Option<DateTime<Utc>>,
    pub value: Option<f64>,
}

/// Scan for the most recent stored observation of one series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointQuery {
    pub measurement: &'static str,
    pub field: &'static str,
    /// Series key code the points are tagged with
    pub series: String,
    /// Lower bound of the scan range
    pub since: DateTime<Utc>,
}

impl CheckpointQuery {
    pub fn spot_prices(key: &SeriesKey, since: DateTime<Utc>) -> Self {
        Self {
            measurement: MEASUREMENT,
            field: FIELD,
            series: key.code().to_owned(),
            since,
        }
    }
}

/// Destination store for observations
#[async_trait]
pub trait TimeSeriesStore: Send + Sync {
    /// Return the last record per stored table matching the query, oldest
    /// bound `query.since`. May return several rows or none.
    async fn scan_latest(&self, query: &CheckpointQuery) -> Result<Vec<StoredRecord>>;

    /// Write one point. A point at an existing timestamp overwrites it.
    ///
    /// `SyncError::Rejected` means this point was refused but the store is
    /// still reachable; any other error is a connection-level fault.
    async fn write_point(&self, point: &Point) -> Result<()>;

    /// Store name for logging
    fn name(&self) -> &str;
}

/// External market data source
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Day-ahead prices for `key` within `window`. Empty when nothing is
    /// published for the window yet.
    async fn day_ahead_prices(&self, key: &SeriesKey, window: &QueryWindow) -> Result<Series>;

    /// Source name for logging
    fn name(&self) -> &str;
}
