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

//! Flux checkpoint query and annotated CSV response parsing.

use chrono::{DateTime, SecondsFormat, Utc};
use csv::{ReaderBuilder, StringRecord};
use elespot_core::{CheckpointQuery, LOCATION_TAG, Result, StoredRecord, SyncError};

/// Build the Flux query returning the last point of the series since
/// `query.since`.
pub fn checkpoint_query(bucket: &str, query: &CheckpointQuery) -> String {
    format!(
        "from(bucket: \"{bucket}\")\n  \
         |> range(start: {since})\n  \
         |> filter(fn: (r) => r._measurement == \"{measurement}\" and r._field == \"{field}\" and r.{tag} == \"{series}\")\n  \
         |> last()",
        bucket = escape_string(bucket),
        since = query.since.to_rfc3339_opts(SecondsFormat::Secs, true),
        measurement = escape_string(query.measurement),
        field = escape_string(query.field),
        tag = LOCATION_TAG,
        series = escape_string(&query.series),
    )
}

fn escape_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Column positions of the table currently being read
#[derive(Debug)]
struct Columns {
    time: Option<usize>,
    value: Option<usize>,
    error: Option<usize>,
}

impl Columns {
    fn from_header(row: &StringRecord) -> Self {
        let position = |name: &str| row.iter().position(|column| column == name);
        Self {
            time: position("_time"),
            value: position("_value"),
            error: position("error"),
        }
    }

    fn record(&self, row: &StringRecord) -> Result<StoredRecord> {
        let time = match self.time.and_then(|i| row.get(i)).filter(|s| !s.is_empty()) {
            Some(raw) => Some(
                DateTime::parse_from_rfc3339(raw)
                    .map(|t| t.with_timezone(&Utc))
                    .map_err(|e| {
                        SyncError::DataIntegrity(format!("unparseable _time '{raw}': {e}"))
                    })?,
            ),
            None => None,
        };
        let value = self
            .value
            .and_then(|i| row.get(i))
            .and_then(|raw| raw.parse::<f64>().ok());
        Ok(StoredRecord { time, value })
    }
}

fn is_header(row: &StringRecord) -> bool {
    let has = |name: &str| row.iter().any(|column| column == name);
    (has("result") && has("table")) || has("error")
}

/// Parse an annotated CSV query response into one record per data row.
///
/// Annotation rows are skipped, each table starts with its own header row,
/// and an error table is reported as a store failure.
pub fn parse_records(body: &str) -> Result<Vec<StoredRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .from_reader(body.as_bytes());

    let mut records = Vec::new();
    let mut columns: Option<Columns> = None;

    for row in reader.records() {
        let row = row.map_err(|e| {
            SyncError::DataIntegrity(format!("unreadable query response: {e}"))
        })?;

        if row.iter().all(str::is_empty) {
            columns = None;
            continue;
        }
        if is_header(&row) {
            columns = Some(Columns::from_header(&row));
            continue;
        }

        let Some(current) = &columns else {
            return Err(SyncError::DataIntegrity(
                "query response row without a header".to_owned(),
            ));
        };
        if let Some(i) = current.error {
            let message = row.get(i).unwrap_or_default();
            return Err(SyncError::store(format!("query failed: {message}")));
        }
        records.push(current.record(&row)?);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use elespot_core::SeriesKey;

    const HEADER: &str = "#group,false,false,true,true,false,false,true,true,true\n\
        #datatype,string,long,dateTime:RFC3339,dateTime:RFC3339,dateTime:RFC3339,double,string,string,string\n\
        #default,_result,,,,,,,,\n\
        ,result,table,_start,_stop,_time,_value,_field,_measurement,location\n";

    #[test]
    fn test_query_filters_series() {
        let key = SeriesKey::resolve("FI", None).unwrap();
        let since = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let flux = checkpoint_query("prices", &CheckpointQuery::spot_prices(&key, since));

        assert!(flux.starts_with("from(bucket: \"prices\")"));
        assert!(flux.contains("range(start: 2024-01-01T00:00:00Z)"));
        assert!(flux.contains("r._measurement == \"spotprice\""));
        assert!(flux.contains("r._field == \"hourly\""));
        assert!(flux.contains("r.location == \"FI\""));
        assert!(flux.ends_with("|> last()"));
    }

    #[test]
    fn test_query_escapes_bucket_name() {
        let key = SeriesKey::resolve("FI", None).unwrap();
        let since = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let flux = checkpoint_query(r#"a"b"#, &CheckpointQuery::spot_prices(&key, since));
        assert!(flux.starts_with(r#"from(bucket: "a\"b")"#));
    }

    #[test]
    fn test_parses_single_record() {
        let body = format!(
            "{HEADER},,0,2023-12-13T00:00:00Z,2024-01-10T12:00:00Z,2024-01-10T22:00:00Z,38.5,hourly,spotprice,FI\r\n\r\n"
        );
        let records = parse_records(&body).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].time,
            Some(Utc.with_ymd_and_hms(2024, 1, 10, 22, 0, 0).unwrap())
        );
        assert_eq!(records[0].value, Some(38.5));
    }

    #[test]
    fn test_parses_multiple_tables() {
        let body = format!(
            "{HEADER},,0,2023-12-13T00:00:00Z,2024-01-10T12:00:00Z,2024-01-10T22:00:00Z,38.5,hourly,spotprice,FI\n\
             \n\
             {HEADER},,1,2023-12-13T00:00:00Z,2024-01-10T12:00:00Z,2024-01-11T03:00:00Z,12,hourly,spotprice,FI\n"
        );
        let records = parse_records(&body).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(
            records[1].time,
            Some(Utc.with_ymd_and_hms(2024, 1, 11, 3, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_empty_response_has_no_records() {
        assert!(parse_records("").unwrap().is_empty());
        assert!(parse_records("\r\n").unwrap().is_empty());
    }

    #[test]
    fn test_missing_time_column_yields_record_without_time() {
        let body = ",result,table,_value\n,,0,38.5\n";
        let records = parse_records(body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].time, None);
    }

    #[test]
    fn test_unparseable_time_is_integrity_error() {
        let body = format!(
            "{HEADER},,0,2023-12-13T00:00:00Z,2024-01-10T12:00:00Z,yesterday,38.5,hourly,spotprice,FI\n"
        );
        let err = parse_records(&body).unwrap_err();
        assert!(matches!(err, SyncError::DataIntegrity(_)));
    }

    #[test]
    fn test_error_table_is_store_failure() {
        let body = "#datatype,string,string\n#group,true,true\n#default,,\n,error,reference\n,bucket not found,\n";
        let err = parse_records(body).unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("bucket not found"));
    }
}
