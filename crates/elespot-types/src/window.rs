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

use chrono::{DateTime, Duration, DurationRound, Utc};
use chrono_tz::Tz;
use std::fmt;

use crate::observation::Checkpoint;

/// Spacing between consecutive hourly observations.
pub fn observation_step() -> Duration {
    Duration::hours(1)
}

/// Truncate an instant to the start of its UTC hour.
pub fn floor_to_hour(t: DateTime<Utc>) -> DateTime<Utc> {
    t.duration_trunc(observation_step()).unwrap_or(t)
}

/// Time horizons bounding one sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Horizons {
    /// How far back the checkpoint scan looks
    pub lookback: Duration,
    /// Cold-start history requested when no checkpoint exists
    pub backfill: Duration,
    /// How far past now to ask for already published day-ahead prices
    pub forward: Duration,
}

impl Default for Horizons {
    fn default() -> Self {
        Self {
            lookback: Duration::weeks(4),
            backfill: Duration::weeks(2),
            forward: Duration::hours(48),
        }
    }
}

/// Half-open `[start, end)` range requested from the price source.
///
/// Always non-empty: `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl QueryWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    /// First instant to request for the given checkpoint.
    ///
    /// Cold start goes back `horizons.backfill` from now in the series' local
    /// zone; otherwise resumes one step after the stored checkpoint.
    pub fn resume_start(
        checkpoint: Checkpoint,
        now: DateTime<Utc>,
        zone: Tz,
        horizons: &Horizons,
    ) -> DateTime<Utc> {
        match checkpoint {
            Checkpoint::Absent => (now.with_timezone(&zone) - horizons.backfill).with_timezone(&Utc),
            Checkpoint::At(last) => last + observation_step(),
        }
    }

    /// Window for this run, or `None` when the resume point is already past
    /// the forward horizon.
    pub fn for_run(
        checkpoint: Checkpoint,
        now: DateTime<Utc>,
        zone: Tz,
        horizons: &Horizons,
    ) -> Option<Self> {
        let start = Self::resume_start(checkpoint, now, zone, horizons);
        Self::new(start, now + horizons.forward)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn start_in(&self, zone: Tz) -> DateTime<Tz> {
        self.start.with_timezone(&zone)
    }

    pub fn end_in(&self, zone: Tz) -> DateTime<Tz> {
        self.end.with_timezone(&zone)
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        t >= self.start && t < self.end
    }
}

impl fmt::Display for QueryWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}
