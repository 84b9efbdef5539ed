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

//! Shared data model for the spot price sync: observations, series,
//! checkpoints, query windows and the series key / bidding zone table.

pub mod observation;
pub mod point;
pub mod window;
pub mod zone;

pub use observation::{Checkpoint, Observation, Series};
pub use point::{FIELD, LOCATION_TAG, MEASUREMENT, Point};
pub use window::{Horizons, QueryWindow, floor_to_hour, observation_step};
pub use zone::{BiddingZone, SeriesKey, ZoneError};
