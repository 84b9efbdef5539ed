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

//! Consecutive runs against quarter-hour ENTSO-E documents.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use elespot_adapters::EntsoeClient;
use elespot_core::{
    CheckpointQuery, Horizons, IncrementalSync, Point, Result, SeriesKey, StoredRecord,
    SyncOutcome, TimeSeriesStore,
};
use mockito::{Matcher, Server};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::Span;

/// Overwrite-by-timestamp store for a single series
#[derive(Clone, Default)]
struct MemoryStore {
    points: Arc<Mutex<BTreeMap<DateTime<Utc>, f64>>>,
}

#[async_trait]
impl TimeSeriesStore for MemoryStore {
    async fn scan_latest(&self, query: &CheckpointQuery) -> Result<Vec<StoredRecord>> {
        let points = self.points.lock().unwrap();
        Ok(points
            .range(query.since..)
            .next_back()
            .map(|(time, value)| StoredRecord {
                time: Some(*time),
                value: Some(*value),
            })
            .into_iter()
            .collect())
    }

    async fn write_point(&self, point: &Point) -> Result<()> {
        self.points.lock().unwrap().insert(point.time, point.value);
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// PT15M document starting 2024-01-11T00:00Z with prices 1, 2, 3, ...
fn quarter_hour_document(quarters: u32) -> String {
    let end = Utc.with_ymd_and_hms(2024, 1, 11, 0, 0, 0).unwrap()
        + chrono::Duration::minutes(15 * i64::from(quarters));
    let points: String = (1..=quarters)
        .map(|p| {
            format!("<Point><position>{p}</position><price.amount>{p}</price.amount></Point>")
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<Publication_MarketDocument xmlns="urn:iec62325.351:tc57wg16:451-3:publicationdocument:7:3">
  <TimeSeries>
    <curveType>A01</curveType>
    <Period>
      <timeInterval><start>2024-01-11T00:00Z</start><end>{}</end></timeInterval>
      <resolution>PT15M</resolution>
      {points}
    </Period>
  </TimeSeries>
</Publication_MarketDocument>"#,
        end.format("%Y-%m-%dT%H:%MZ")
    )
}

fn hour(h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 11, h, 0, 0).unwrap()
}

async fn run(store: &MemoryStore, url: &str, now: DateTime<Utc>) -> SyncOutcome {
    let source = EntsoeClient::new(url, "api-key", Duration::from_secs(5)).unwrap();
    let key = SeriesKey::resolve("FI", None).unwrap();
    IncrementalSync::new(store.clone(), source, key, Horizons::default(), Span::none())
        .run(now)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_consecutive_quarter_hour_runs_leave_no_gap() {
    let mut server = Server::new_async().await;
    let now = Utc.with_ymd_and_hms(2024, 1, 11, 0, 30, 0).unwrap();

    // Cold start: two weeks back from local time, floored to the hour
    let first = server
        .mock("GET", "/api")
        .match_query(Matcher::UrlEncoded("periodStart".into(), "202312280000".into()))
        .with_status(200)
        .with_body(quarter_hour_document(8))
        .create_async()
        .await;
    // Resume: the hour after the stored checkpoint
    let second = server
        .mock("GET", "/api")
        .match_query(Matcher::UrlEncoded("periodStart".into(), "202401110200".into()))
        .with_status(200)
        .with_body(quarter_hour_document(16))
        .create_async()
        .await;

    let store = MemoryStore::default();

    let outcome = run(&store, &server.url(), now).await;
    assert_eq!(outcome.success_count(), 2);

    let outcome = run(&store, &server.url(), now).await;
    assert_eq!(outcome.success_count(), 2);

    first.assert_async().await;
    second.assert_async().await;

    let points = store.points.lock().unwrap();
    let stamps: Vec<_> = points.keys().copied().collect();
    assert_eq!(stamps, vec![hour(0), hour(1), hour(2), hour(3)]);

    let values: Vec<f64> = points.values().copied().collect();
    for (value, expected) in values.iter().zip([2.5, 6.5, 10.5, 14.5]) {
        assert!((value - expected).abs() < 1e-9, "{value} != {expected}");
    }
}
