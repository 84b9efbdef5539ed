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

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};

use crate::window::QueryWindow;

/// A single price value keyed by its timestamp.
///
/// The timestamp is the identity: one observation per hour per series key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    /// Price in the source currency per MWh
    pub value: f64,
}

impl Observation {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Observations ordered by timestamp ascending, at most one per timestamp.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    observations: Vec<Observation>,
}

impl Series {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a series from observations in any order.
    ///
    /// Duplicate timestamps collapse to the value that came last.
    pub fn from_observations<I>(observations: I) -> Self
    where
        I: IntoIterator<Item = Observation>,
    {
        let by_time: BTreeMap<DateTime<Utc>, f64> = observations
            .into_iter()
            .map(|o| (o.timestamp, o.value))
            .collect();

        Self {
            observations: by_time
                .into_iter()
                .map(|(timestamp, value)| Observation { timestamp, value })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.observations.iter()
    }

    pub fn first(&self) -> Option<&Observation> {
        self.observations.first()
    }

    pub fn last(&self) -> Option<&Observation> {
        self.observations.last()
    }

    /// Keep only observations inside `window`.
    #[must_use]
    pub fn truncate_to(self, window: &QueryWindow) -> Self {
        Self {
            observations: self
                .observations
                .into_iter()
                .filter(|o| window.contains(o.timestamp))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.observations.iter()
    }
}

impl FromIterator<Observation> for Series {
    fn from_iter<T: IntoIterator<Item = Observation>>(iter: T) -> Self {
        Self::from_observations(iter)
    }
}

/// Most recent stored observation time for a series key.
///
/// Never persisted on its own; recomputed each run from the store content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoint {
    /// Nothing stored within the lookback horizon
    Absent,
    At(DateTime<Utc>),
}

impl From<Option<DateTime<Utc>>> for Checkpoint {
    fn from(value: Option<DateTime<Utc>>) -> Self {
        value.map_or(Self::Absent, Self::At)
    }
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "absent"),
            Self::At(t) => write!(f, "{}", t.to_rfc3339()),
        }
    }
}
