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

use super::document::{self, Document};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use elespot_core::{
    PriceSource, QueryWindow, Result, Series, SeriesKey, SyncError, floor_to_hour,
    observation_step,
};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, trace};

pub const DEFAULT_API_URL: &str = "https://web-api.tp.entsoe.eu";

/// Price Document, day-ahead prices (4.2.10)
const DAY_AHEAD_PRICES: &str = "A44";

#[derive(Clone)]
pub struct EntsoeClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl std::fmt::Debug for EntsoeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntsoeClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl EntsoeClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::source(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            api_key: api_key.into(),
            client,
        })
    }
}

/// `yyyyMMddHH00` in UTC. The end bound is rounded up so the hour holding
/// it is requested too.
fn period_bounds(window: &QueryWindow) -> (String, String) {
    let start = floor_to_hour(window.start());
    let mut end = floor_to_hour(window.end());
    if end < window.end() {
        end += observation_step();
    }
    (format_period(start), format_period(end))
}

fn format_period(t: DateTime<Utc>) -> String {
    t.format("%Y%m%d%H00").to_string()
}

#[async_trait]
impl PriceSource for EntsoeClient {
    async fn day_ahead_prices(&self, key: &SeriesKey, window: &QueryWindow) -> Result<Series> {
        let (period_start, period_end) = period_bounds(window);
        debug!(
            "Requesting {} prices for {} from {} to {}",
            DAY_AHEAD_PRICES,
            key.eic(),
            period_start,
            period_end
        );

        let response = self
            .client
            .get(format!("{}/api", self.base_url))
            .query(&[
                ("securityToken", self.api_key.as_str()),
                ("documentType", DAY_AHEAD_PRICES),
                ("in_Domain", key.eic()),
                ("out_Domain", key.eic()),
                ("periodStart", period_start.as_str()),
                ("periodEnd", period_end.as_str()),
            ])
            .send()
            .await
            // The request URL carries the security token
            .map_err(|e| SyncError::source(format!("request failed: {}", e.without_url())))?;

        let status = response.status();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(SyncError::source(format!(
                    "not authorized ({status}), check the API key"
                )));
            }
            status if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS => {
                return Err(SyncError::source(format!("request failed with {status}")));
            }
            _ => {}
        }

        let body = response
            .text()
            .await
            .map_err(|e| SyncError::source(format!("response unreadable: {}", e.without_url())))?;
        trace!("Price response ({}): {}", status, body);

        match document::parse(&body)? {
            Document::Prices(series) => Ok(series.truncate_to(window)),
            Document::Acknowledgement(ack) if ack.is_no_data() => {
                debug!("No prices published: {}", ack.reason());
                Ok(Series::empty())
            }
            Document::Acknowledgement(ack) => Err(SyncError::Source(ack.reason())),
        }
    }

    fn name(&self) -> &str {
        "entsoe"
    }
}
