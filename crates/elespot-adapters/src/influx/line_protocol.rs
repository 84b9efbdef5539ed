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

//! Line protocol encoding for single points.

use elespot_core::{Point, Result, SyncError};

/// Encode `point` as one line of InfluxDB line protocol with second precision.
///
/// Non-finite values have no line protocol form and are rejected before
/// anything is sent.
pub fn encode(point: &Point) -> Result<String> {
    if !point.value.is_finite() {
        return Err(SyncError::Rejected {
            status: 400,
            message: format!(
                "{} value {} at {} is not a finite number",
                point.field, point.value, point.time
            ),
        });
    }

    let mut tags: Vec<&(String, String)> = point.tags.iter().collect();
    tags.sort_by(|a, b| a.0.cmp(&b.0));
    let tag_set: String = tags
        .into_iter()
        .map(|(key, value)| format!(",{}={}", escape_key(key), escape_key(value)))
        .collect();

    Ok(format!(
        "{}{} {}={} {}",
        escape_measurement(&point.measurement),
        tag_set,
        escape_key(&point.field),
        point.value,
        point.time.timestamp()
    ))
}

fn escape_measurement(name: &str) -> String {
    escape(name, &[',', ' '])
}

/// Tag keys, tag values and field keys share the same escaping rules
fn escape_key(name: &str) -> String {
    escape(name, &[',', '=', ' '])
}

fn escape(input: &str, special: &[char]) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if c == '\\' || special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
