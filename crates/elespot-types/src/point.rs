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

use chrono::{DateTime, Utc};

use crate::observation::Observation;
use crate::zone::SeriesKey;

/// Measurement name every observation is stored under.
pub const MEASUREMENT: &str = "spotprice";

/// Field holding the hourly price.
pub const FIELD: &str = "hourly";

/// Tag carrying the series key.
pub const LOCATION_TAG: &str = "location";

/// A store record: one float field at one timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub measurement: String,
    pub tags: Vec<(String, String)>,
    pub field: String,
    pub value: f64,
    pub time: DateTime<Utc>,
}

impl Point {
    /// The stored form of a spot price observation for `key`.
    pub fn spot_price(key: &SeriesKey, observation: &Observation) -> Self {
        Self {
            measurement: MEASUREMENT.to_owned(),
            tags: vec![(LOCATION_TAG.to_owned(), key.code().to_owned())],
            field: FIELD.to_owned(),
            value: observation.value,
            time: observation.timestamp,
        }
    }
}
