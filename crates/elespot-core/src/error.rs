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

//! Error types for the sync run

use std::fmt;
use thiserror::Error;

/// Remote side of a failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Store,
    Source,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store => write!(f, "time-series store"),
            Self::Source => write!(f, "price source"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SyncError {
    /// Unreachable, unauthorized, timed out or failed server side
    #[error("{service} unavailable: {message}")]
    Connectivity { service: Service, message: String },

    #[error("checkpoint data integrity error: {0}")]
    DataIntegrity(String),

    #[error("price source returned an unusable response: {0}")]
    Source(String),

    /// A single write refused by the store; the connection is still usable
    #[error("write rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
}

impl SyncError {
    pub fn store(message: impl Into<String>) -> Self {
        Self::Connectivity {
            service: Service::Store,
            message: message.into(),
        }
    }

    pub fn source(message: impl Into<String>) -> Self {
        Self::Connectivity {
            service: Service::Source,
            message: message.into(),
        }
    }

    /// Whether the error ends the run. Only a rejected write does not.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Rejected { .. })
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
