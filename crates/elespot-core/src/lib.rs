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

//! Incremental spot price sync.
//!
//! One run resolves the last stored observation from the store, fetches the
//! prices published after it, and writes them back one point at a time:
//! [`CheckpointResolver`] -> [`PriceFetcher`] -> [`IngestionWriter`], composed
//! by [`IncrementalSync`].

pub mod error;
pub mod fetcher;
pub mod resolver;
pub mod sync;
pub mod traits;
pub mod writer;

pub use elespot_types::*;
pub use error::{Result, Service, SyncError};
pub use fetcher::PriceFetcher;
pub use resolver::CheckpointResolver;
pub use sync::{IncrementalSync, SyncOutcome};
pub use traits::{CheckpointQuery, PriceSource, StoredRecord, TimeSeriesStore};
pub use writer::{IngestionWriter, WriteReport};
