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

//! ENTSO-E market documents (IEC 62325 XML).

use chrono::{DateTime, Duration, Utc};
use elespot_core::{Observation, Result, Series, SyncError, floor_to_hour, observation_step};
use quick_xml::Reader;
use quick_xml::events::Event;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Reason code ENTSO-E uses when nothing is published for the request
const NO_MATCHING_DATA: &str = "999";

/// Curve type whose repeated values are omitted from the point list
const VARIABLE_SIZED_BLOCKS: &str = "A03";

#[derive(Debug)]
pub enum Document {
    Prices(Series),
    Acknowledgement(Acknowledgement),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acknowledgement {
    pub code: String,
    pub text: Option<String>,
}

impl Acknowledgement {
    pub fn is_no_data(&self) -> bool {
        self.code == NO_MATCHING_DATA
            || self
                .text
                .as_deref()
                .is_some_and(|t| t.contains("No matching data found"))
    }

    pub fn reason(&self) -> String {
        match &self.text {
            Some(text) => format!("{} ({})", text, self.code),
            None => format!("reason code {}", self.code),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PublicationDocument {
    #[serde(rename = "TimeSeries", default)]
    time_series: Vec<TimeSeries>,
}

#[derive(Debug, Deserialize)]
struct TimeSeries {
    #[serde(rename = "curveType", default)]
    curve_type: Option<String>,
    #[serde(rename = "Period", default)]
    periods: Vec<Period>,
}

#[derive(Debug, Deserialize)]
struct Period {
    #[serde(rename = "timeInterval")]
    time_interval: TimeInterval,
    resolution: String,
    #[serde(rename = "Point", default)]
    points: Vec<PricePoint>,
}

#[derive(Debug, Deserialize)]
struct TimeInterval {
    start: String,
    end: String,
}

#[derive(Debug, Deserialize)]
struct PricePoint {
    position: u32,
    #[serde(rename = "price.amount")]
    price: f64,
}

#[derive(Debug, Deserialize)]
struct AcknowledgementDocument {
    #[serde(rename = "Reason", default)]
    reasons: Vec<Reason>,
}

#[derive(Debug, Deserialize)]
struct Reason {
    code: String,
    #[serde(default)]
    text: Option<String>,
}

/// Parse a response body into prices or an acknowledgement.
pub fn parse(xml: &str) -> Result<Document> {
    match root_element(xml)?.as_str() {
        "Publication_MarketDocument" => {
            let document: PublicationDocument = quick_xml::de::from_str(xml)
                .map_err(|e| SyncError::Source(format!("malformed price document: {e}")))?;
            document.into_series().map(Document::Prices)
        }
        "Acknowledgement_MarketDocument" => {
            let document: AcknowledgementDocument = quick_xml::de::from_str(xml)
                .map_err(|e| SyncError::Source(format!("malformed acknowledgement: {e}")))?;
            let reason = document
                .reasons
                .into_iter()
                .next()
                .ok_or_else(|| SyncError::Source("acknowledgement without reason".to_owned()))?;
            Ok(Document::Acknowledgement(Acknowledgement {
                code: reason.code,
                text: reason.text,
            }))
        }
        other => Err(SyncError::Source(format!("unexpected document '{other}'"))),
    }
}

fn root_element(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    loop {
        let event = reader
            .read_event()
            .map_err(|e| SyncError::Source(format!("response is not XML: {e}")))?;
        if let Event::Start(start) = &event {
            return Ok(String::from_utf8_lossy(start.local_name().as_ref()).into_owned());
        }
        if matches!(event, Event::Eof) {
            return Err(SyncError::Source("empty response document".to_owned()));
        }
    }
}

impl PublicationDocument {
    /// One observation per hour. Sub-hourly periods are averaged per UTC
    /// hour; an hourly period covering the same hour takes precedence.
    fn into_series(self) -> Result<Series> {
        let mut averaged = Vec::new();
        let mut hourly = Vec::new();
        for series in self.time_series {
            let forward_fill = series.curve_type.as_deref() == Some(VARIABLE_SIZED_BLOCKS);
            for period in series.periods {
                let step = parse_resolution(&period.resolution)?;
                let points = period.expand(step, forward_fill)?;
                if step < observation_step() {
                    averaged.extend(hourly_means(&points));
                } else {
                    hourly.extend(points);
                }
            }
        }
        // Later entries win on equal timestamps
        Ok(Series::from_observations(averaged.into_iter().chain(hourly)))
    }
}

impl Period {
    /// One observation per resolution step between the interval bounds.
    /// Positions are 1-based.
    fn expand(&self, step: Duration, forward_fill: bool) -> Result<Vec<Observation>> {
        let start = parse_instant(&self.time_interval.start)?;
        let end = parse_instant(&self.time_interval.end)?;

        let prices: BTreeMap<u32, f64> =
            self.points.iter().map(|p| (p.position, p.price)).collect();

        let mut out = Vec::new();
        let mut last = None;
        let mut position = 1;
        let mut timestamp = start;
        while timestamp < end {
            let price = match prices.get(&position) {
                Some(price) => Some(*price),
                None if forward_fill => last,
                None => None,
            };
            if let Some(price) = price {
                out.push(Observation::new(timestamp, price));
                last = Some(price);
            }
            position += 1;
            timestamp += step;
        }
        Ok(out)
    }
}

/// Mean price per UTC hour
fn hourly_means(points: &[Observation]) -> Vec<Observation> {
    let mut sums: BTreeMap<DateTime<Utc>, (f64, u32)> = BTreeMap::new();
    for point in points {
        let (sum, count) = sums
            .entry(floor_to_hour(point.timestamp))
            .or_insert((0.0, 0));
        *sum += point.value;
        *count += 1;
    }
    sums.into_iter()
        .map(|(hour, (sum, count))| Observation::new(hour, sum / f64::from(count)))
        .collect()
}

/// Instants come as `2024-01-10T23:00Z`, without seconds.
fn parse_instant(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .or_else(|e| match raw.strip_suffix('Z') {
            Some(minutes) => DateTime::parse_from_rfc3339(&format!("{minutes}:00Z")),
            None => Err(e),
        })
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| SyncError::Source(format!("invalid instant '{raw}': {e}")))
}

/// ISO 8601 durations as used for period resolution: PT15M, PT60M, PT1H, P1D
fn parse_resolution(raw: &str) -> Result<Duration> {
    let invalid = || SyncError::Source(format!("unsupported resolution '{raw}'"));
    let raw = raw.trim();

    let step = if let Some(time) = raw.strip_prefix("PT") {
        if let Some(minutes) = time.strip_suffix('M') {
            Duration::minutes(minutes.parse().map_err(|_| invalid())?)
        } else if let Some(hours) = time.strip_suffix('H') {
            Duration::hours(hours.parse().map_err(|_| invalid())?)
        } else {
            return Err(invalid());
        }
    } else if let Some(days) = raw.strip_prefix('P').and_then(|d| d.strip_suffix('D')) {
        Duration::days(days.parse().map_err(|_| invalid())?)
    } else {
        return Err(invalid());
    };

    if step <= Duration::zero() {
        return Err(invalid());
    }
    Ok(step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn publication(curve_type: &str, resolution: &str, points: &[(u32, f64)]) -> String {
        let points: String = points
            .iter()
            .map(|(position, price)| {
                format!(
                    "<Point><position>{position}</position><price.amount>{price}</price.amount></Point>"
                )
            })
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<Publication_MarketDocument xmlns="urn:iec62325.351:tc57wg16:451-3:publicationdocument:7:3">
  <mRID>5b7f4a5c1d2e4f</mRID>
  <type>A44</type>
  <period.timeInterval><start>2024-01-10T23:00Z</start><end>2024-01-11T23:00Z</end></period.timeInterval>
  <TimeSeries>
    <mRID>1</mRID>
    <businessType>A62</businessType>
    <in_Domain.mRID codingScheme="A01">10YFI-1--------U</in_Domain.mRID>
    <currency_Unit.name>EUR</currency_Unit.name>
    <curveType>{curve_type}</curveType>
    <Period>
      <timeInterval><start>2024-01-10T23:00Z</start><end>2024-01-11T03:00Z</end></timeInterval>
      <resolution>{resolution}</resolution>
      {points}
    </Period>
  </TimeSeries>
</Publication_MarketDocument>"#
        )
    }

    fn prices(xml: &str) -> Series {
        match parse(xml).unwrap() {
            Document::Prices(series) => series,
            Document::Acknowledgement(ack) => panic!("unexpected acknowledgement {ack:?}"),
        }
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, 23, 0, 0).unwrap() + Duration::hours(i64::from(hour))
    }

    #[test]
    fn test_parses_hourly_points() {
        let xml = publication("A01", "PT60M", &[(1, 38.5), (2, 36.1), (3, -0.5), (4, 40.0)]);
        let series = prices(&xml);

        assert_eq!(series.len(), 4);
        let observations: Vec<_> = series.iter().collect();
        assert_eq!(observations[0].timestamp, at(0));
        assert!((observations[0].value - 38.5).abs() < f64::EPSILON);
        assert_eq!(observations[2].timestamp, at(2));
        assert!((observations[2].value + 0.5).abs() < f64::EPSILON);
        assert_eq!(observations[3].timestamp, at(3));
    }

    #[test]
    fn test_forward_fills_variable_sized_blocks() {
        let xml = publication("A03", "PT60M", &[(1, 38.5), (3, 20.0)]);
        let series = prices(&xml);

        let values: Vec<f64> = series.iter().map(|o| o.value).collect();
        assert_eq!(values, vec![38.5, 38.5, 20.0, 20.0]);
        assert_eq!(series.last().unwrap().timestamp, at(3));
    }

    #[test]
    fn test_missing_positions_left_out_without_fill() {
        let xml = publication("A01", "PT60M", &[(1, 38.5), (3, 20.0)]);
        let series = prices(&xml);

        let stamps: Vec<_> = series.iter().map(|o| o.timestamp).collect();
        assert_eq!(stamps, vec![at(0), at(2)]);
    }

    fn assert_value(observation: &Observation, expected: f64) {
        assert!(
            (observation.value - expected).abs() < 1e-9,
            "{} != {expected}",
            observation.value
        );
    }

    #[test]
    fn test_quarter_hours_averaged_per_hour() {
        let points: Vec<(u32, f64)> = (1..=8).map(|p| (p, 9.0 + f64::from(p))).collect();
        let xml = publication("A01", "PT15M", &points);
        let series = prices(&xml);

        let observations: Vec<_> = series.iter().collect();
        assert_eq!(observations.len(), 2);
        assert_eq!(observations[0].timestamp, at(0));
        assert_value(observations[0], 11.5);
        assert_eq!(observations[1].timestamp, at(1));
        assert_value(observations[1], 15.5);
    }

    #[test]
    fn test_quarter_hours_forward_filled_before_averaging() {
        let xml = publication("A03", "PT15M", &[(1, 10.0), (3, 20.0)]);
        let series = prices(&xml);

        let observations: Vec<_> = series.iter().collect();
        assert_eq!(observations.len(), 4);
        assert_value(observations[0], 15.0);
        assert_value(observations[1], 20.0);
        assert_value(observations[3], 20.0);
        assert_eq!(observations[3].timestamp, at(3));
    }

    #[test]
    fn test_half_hours_averaged_per_hour() {
        let xml = publication("A01", "PT30M", &[(1, 10.0), (2, 20.0), (3, 30.0)]);
        let series = prices(&xml);

        let observations: Vec<_> = series.iter().collect();
        assert_eq!(observations.len(), 2);
        assert_value(observations[0], 15.0);
        assert_value(observations[1], 30.0);
    }

    #[test]
    fn test_hourly_series_preferred_over_quarter_hours() {
        let quarters: String = (1..=4)
            .map(|p| format!("<Point><position>{p}</position><price.amount>10</price.amount></Point>"))
            .collect();
        let xml = format!(
            r#"<Publication_MarketDocument>
  <TimeSeries>
    <curveType>A01</curveType>
    <Period>
      <timeInterval><start>2024-01-10T23:00Z</start><end>2024-01-11T00:00Z</end></timeInterval>
      <resolution>PT60M</resolution>
      <Point><position>1</position><price.amount>50</price.amount></Point>
    </Period>
  </TimeSeries>
  <TimeSeries>
    <curveType>A01</curveType>
    <Period>
      <timeInterval><start>2024-01-10T23:00Z</start><end>2024-01-11T00:00Z</end></timeInterval>
      <resolution>PT15M</resolution>
      {quarters}
    </Period>
  </TimeSeries>
</Publication_MarketDocument>"#
        );
        let series = prices(&xml);

        assert_eq!(series.len(), 1);
        assert_eq!(series.first().unwrap().timestamp, at(0));
        assert_value(series.first().unwrap(), 50.0);
    }

    #[test]
    fn test_points_beyond_interval_dropped() {
        let xml = publication("A01", "PT60M", &[(1, 1.0), (5, 5.0)]);
        assert_eq!(prices(&xml).len(), 1);
    }

    #[test]
    fn test_no_matching_data_acknowledgement() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<Acknowledgement_MarketDocument xmlns="urn:iec62325.351:tc57wg16:451-1:acknowledgementdocument:7:0">
  <mRID>a1b2</mRID>
  <createdDateTime>2024-01-11T12:00:00Z</createdDateTime>
  <Reason>
    <code>999</code>
    <text>No matching data found for Data item ENERGY_PRICES [12.1.D] (10YFI-1--------U, 10YFI-1--------U) and interval 2024-01-12T23:00:00.000Z/2024-01-13T23:00:00.000Z.</text>
  </Reason>
</Acknowledgement_MarketDocument>"#;

        let Document::Acknowledgement(ack) = parse(xml).unwrap() else {
            panic!("expected acknowledgement");
        };
        assert!(ack.is_no_data());
    }

    #[test]
    fn test_other_acknowledgement_is_not_empty_data() {
        let ack = Acknowledgement {
            code: "999".to_owned(),
            text: None,
        };
        assert!(ack.is_no_data());

        let ack = Acknowledgement {
            code: "B18".to_owned(),
            text: Some("Invalid query attribute".to_owned()),
        };
        assert!(!ack.is_no_data());
        assert_eq!(ack.reason(), "Invalid query attribute (B18)");
    }

    #[test]
    fn test_rejects_non_xml_and_unknown_documents() {
        assert!(matches!(
            parse("<html><body>Bad gateway</body></html>"),
            Err(SyncError::Source(_))
        ));
        assert!(matches!(parse(""), Err(SyncError::Source(_))));
    }

    #[test]
    fn test_parse_instant_formats() {
        assert_eq!(parse_instant("2024-01-10T23:00Z").unwrap(), at(0));
        assert_eq!(parse_instant("2024-01-10T23:00:00Z").unwrap(), at(0));
        assert!(parse_instant("yesterday").is_err());
    }

    #[test]
    fn test_parse_resolution() {
        assert_eq!(parse_resolution("PT15M").unwrap(), Duration::minutes(15));
        assert_eq!(parse_resolution("PT60M").unwrap(), Duration::hours(1));
        assert_eq!(parse_resolution("PT1H").unwrap(), Duration::hours(1));
        assert_eq!(parse_resolution("P1D").unwrap(), Duration::days(1));
        assert!(parse_resolution("PT0M").is_err());
        assert!(parse_resolution("P1Y").is_err());
    }
}
