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

use anyhow::{Context, Result, bail};
use chrono::Duration;
use chrono_tz::Tz;
use elespot_adapters::entsoe::DEFAULT_API_URL;
use elespot_core::{Horizons, SeriesKey};
use serde::Deserialize;
use std::path::Path;

use crate::logging;

pub const DEFAULT_CONFIG_PATH: &str = "elespot.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub influx2: InfluxSettings,
    pub entsoe: EntsoeSettings,
    #[serde(default)]
    pub sync: SyncSettings,
    #[serde(default)]
    pub debug: DebugSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InfluxSettings {
    pub url: String,
    /// May be left out when `INFLUX_TOKEN` is set
    #[serde(default)]
    pub token: String,
    pub org: String,
    pub bucket: String,
    #[serde(default = "default_influx_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EntsoeSettings {
    /// Bidding zone code such as `FI`, or a raw EIC area code
    pub location: String,
    /// May be left out when `ENTSOE_API_KEY` is set
    #[serde(default)]
    pub entsoe_api_key: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// IANA zone name, required for EIC codes missing from the zone table
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default = "default_entsoe_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncSettings {
    #[serde(default = "default_lookback_weeks")]
    pub lookback_weeks: u32,
    #[serde(default = "default_backfill_weeks")]
    pub backfill_weeks: u32,
    #[serde(default = "default_forward_hours")]
    pub forward_hours: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DebugSettings {
    #[serde(default = "default_verbosity")]
    pub verbosity: String,
}

fn default_influx_timeout_secs() -> u64 {
    30
}

fn default_entsoe_timeout_secs() -> u64 {
    60
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_owned()
}

fn default_lookback_weeks() -> u32 {
    4
}

fn default_backfill_weeks() -> u32 {
    2
}

fn default_forward_hours() -> u32 {
    48
}

fn default_verbosity() -> String {
    "NOTSET".to_owned()
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            lookback_weeks: default_lookback_weeks(),
            backfill_weeks: default_backfill_weeks(),
            forward_hours: default_forward_hours(),
        }
    }
}

impl Default for DebugSettings {
    fn default() -> Self {
        Self {
            verbosity: default_verbosity(),
        }
    }
}

impl AppConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config TOML: {}", path.display()))?;
        config.apply_overrides(
            std::env::var("INFLUX_TOKEN").ok(),
            std::env::var("ENTSOE_API_KEY").ok(),
        );
        config.validate()?;
        Ok(config)
    }

    /// Secrets from the environment replace the ones in the file.
    fn apply_overrides(&mut self, influx_token: Option<String>, api_key: Option<String>) {
        if let Some(token) = influx_token.filter(|t| !t.is_empty()) {
            self.influx2.token = token;
        }
        if let Some(key) = api_key.filter(|k| !k.is_empty()) {
            self.entsoe.entsoe_api_key = key;
        }
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("influx2.url", &self.influx2.url),
            ("influx2.token", &self.influx2.token),
            ("influx2.org", &self.influx2.org),
            ("influx2.bucket", &self.influx2.bucket),
            ("entsoe.location", &self.entsoe.location),
            ("entsoe.entsoe_api_key", &self.entsoe.entsoe_api_key),
            ("entsoe.api_url", &self.entsoe.api_url),
        ] {
            if value.trim().is_empty() {
                bail!("{name} must be set");
            }
        }
        if self.sync.lookback_weeks == 0
            || self.sync.backfill_weeks == 0
            || self.sync.forward_hours == 0
        {
            bail!("sync horizons must be positive");
        }
        if self.influx2.timeout_secs == 0 || self.entsoe.timeout_secs == 0 {
            bail!("timeouts must be positive");
        }
        if logging::level_for(&self.debug.verbosity).is_none() {
            bail!("debug.verbosity '{}' is not a known level", self.debug.verbosity);
        }
        self.series_key()?;
        Ok(())
    }

    pub fn timezone(&self) -> Result<Option<Tz>> {
        self.entsoe
            .timezone
            .as_deref()
            .map(|name| {
                name.parse::<Tz>()
                    .map_err(|e| anyhow::anyhow!("entsoe.timezone '{name}' is invalid: {e}"))
            })
            .transpose()
    }

    pub fn series_key(&self) -> Result<SeriesKey> {
        SeriesKey::resolve(&self.entsoe.location, self.timezone()?)
            .context("entsoe.location does not name a bidding zone")
    }

    pub fn horizons(&self) -> Horizons {
        Horizons {
            lookback: Duration::weeks(i64::from(self.sync.lookback_weeks)),
            backfill: Duration::weeks(i64::from(self.sync.backfill_weeks)),
            forward: Duration::hours(i64::from(self.sync.forward_hours)),
        }
    }
}
