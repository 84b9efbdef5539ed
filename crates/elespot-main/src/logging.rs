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

//! Log verbosity mapping and subscriber setup.

use tracing::Subscriber;
use tracing_subscriber::EnvFilter;

/// Crates whose diagnostics follow the configured verbosity. Everything else
/// stays at info so HTTP internals do not flood debug output.
const OWN_TARGETS: &[&str] = &["elespot", "elespot_core", "elespot_adapters"];

/// Map a verbosity name to a `tracing` level directive.
///
/// Accepts the syslog-style names (`NOTSET`, `WARNING`, `CRITICAL`, ...)
/// as well as the `tracing` ones, in any case.
pub fn level_for(verbosity: &str) -> Option<&'static str> {
    match verbosity.trim().to_ascii_uppercase().as_str() {
        "NOTSET" | "TRACE" => Some("trace"),
        "DEBUG" => Some("debug"),
        "INFO" => Some("info"),
        "WARNING" | "WARN" => Some("warn"),
        "ERROR" | "CRITICAL" | "FATAL" => Some("error"),
        _ => None,
    }
}

/// Filter directives for `verbosity`
pub fn directives(verbosity: &str) -> String {
    let level = level_for(verbosity).unwrap_or("info");
    match level {
        "trace" | "debug" => {
            let own: Vec<String> = OWN_TARGETS.iter().map(|t| format!("{t}={level}")).collect();
            format!("info,{}", own.join(","))
        }
        _ => level.to_owned(),
    }
}

/// `RUST_LOG` wins over the configured verbosity when set.
pub fn env_filter(verbosity: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives(verbosity)))
}

pub fn subscriber(verbosity: &str) -> impl Subscriber + Send + Sync + 'static {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbosity))
        .with_target(false)
        .finish()
}
