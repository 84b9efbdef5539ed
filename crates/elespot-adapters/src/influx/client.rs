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

use super::{flux, line_protocol};
use async_trait::async_trait;
use elespot_core::{CheckpointQuery, Point, Result, StoredRecord, SyncError, TimeSeriesStore};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, trace};

/// InfluxDB 2.x store bound to one organization and bucket
#[derive(Clone)]
pub struct InfluxStore {
    base_url: String,
    token: String,
    org: String,
    bucket: String,
    client: Client,
}

impl std::fmt::Debug for InfluxStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InfluxStore")
            .field("base_url", &self.base_url)
            .field("org", &self.org)
            .field("bucket", &self.bucket)
            .finish_non_exhaustive()
    }
}

/// Error body returned by the InfluxDB API
#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

impl InfluxStore {
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        org: impl Into<String>,
        bucket: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::store(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            token: token.into(),
            org: org.into(),
            bucket: bucket.into(),
            client,
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn authorization(&self) -> String {
        format!("Token {}", self.token)
    }
}

/// Status and message of a failed response
async fn failure(response: Response) -> (StatusCode, String) {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiError>(&body).map_or(body, |e| e.message);
    (status, message)
}

#[async_trait]
impl TimeSeriesStore for InfluxStore {
    async fn scan_latest(&self, query: &CheckpointQuery) -> Result<Vec<StoredRecord>> {
        let flux = flux::checkpoint_query(&self.bucket, query);
        debug!("Checkpoint query: {}", flux);

        let response = self
            .client
            .post(format!("{}/api/v2/query", self.base_url))
            .query(&[("org", self.org.as_str())])
            .header(AUTHORIZATION, self.authorization())
            .header(CONTENT_TYPE, "application/vnd.flux")
            .header(ACCEPT, "application/csv")
            .body(flux)
            .send()
            .await
            .map_err(|e| SyncError::store(format!("query request failed: {e}")))?;

        if response.status().is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| SyncError::store(format!("query response unreadable: {e}")))?;
            trace!("Checkpoint query response: {}", body);
            return flux::parse_records(&body);
        }

        let (status, message) = failure(response).await;
        Err(SyncError::store(format!("query failed with {status}: {message}")))
    }

    async fn write_point(&self, point: &Point) -> Result<()> {
        let line = line_protocol::encode(point)?;
        debug!("Write: {}", line);

        let response = self
            .client
            .post(format!("{}/api/v2/write", self.base_url))
            .query(&[
                ("org", self.org.as_str()),
                ("bucket", self.bucket.as_str()),
                ("precision", "s"),
            ])
            .header(AUTHORIZATION, self.authorization())
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(line)
            .send()
            .await
            .map_err(|e| SyncError::store(format!("write request failed: {e}")))?;

        if response.status().is_success() {
            return Ok(());
        }

        let (status, message) = failure(response).await;
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(SyncError::store(format!(
                "write not authorized ({status}): {message}"
            ))),
            status if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS => Err(
                SyncError::store(format!("write failed with {status}: {message}")),
            ),
            status => Err(SyncError::Rejected {
                status: status.as_u16(),
                message,
            }),
        }
    }

    fn name(&self) -> &str {
        "influxdb"
    }
}
