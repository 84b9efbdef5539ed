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

use chrono_tz::Tz;
use chrono_tz::Europe;
use std::fmt;
use thiserror::Error;

/// ENTSO-E bidding zone: short code, EIC area code and local time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BiddingZone {
    pub code: &'static str,
    pub eic: &'static str,
    pub timezone: Tz,
}

const fn zone(code: &'static str, eic: &'static str, timezone: Tz) -> BiddingZone {
    BiddingZone {
        code,
        eic,
        timezone,
    }
}

/// Day-ahead bidding zones known by code.
pub const BIDDING_ZONES: &[BiddingZone] = &[
    zone("FI", "10YFI-1--------U", Europe::Helsinki),
    zone("EE", "10Y1001A1001A39I", Europe::Tallinn),
    zone("LV", "10YLV-1001A00074", Europe::Riga),
    zone("LT", "10YLT-1001A0008Q", Europe::Vilnius),
    zone("SE_1", "10Y1001A1001A44P", Europe::Stockholm),
    zone("SE_2", "10Y1001A1001A45N", Europe::Stockholm),
    zone("SE_3", "10Y1001A1001A46L", Europe::Stockholm),
    zone("SE_4", "10Y1001A1001A47J", Europe::Stockholm),
    zone("NO_1", "10YNO-1--------2", Europe::Oslo),
    zone("NO_2", "10YNO-2--------T", Europe::Oslo),
    zone("NO_3", "10YNO-3--------J", Europe::Oslo),
    zone("NO_4", "10YNO-4--------9", Europe::Oslo),
    zone("NO_5", "10Y1001A1001A48H", Europe::Oslo),
    zone("DK_1", "10YDK-1--------W", Europe::Copenhagen),
    zone("DK_2", "10YDK-2--------M", Europe::Copenhagen),
    zone("DE_LU", "10Y1001A1001A82H", Europe::Berlin),
    zone("AT", "10YAT-APG------L", Europe::Vienna),
    zone("BE", "10YBE----------2", Europe::Brussels),
    zone("NL", "10YNL----------L", Europe::Amsterdam),
    zone("FR", "10YFR-RTE------C", Europe::Paris),
    zone("CH", "10YCH-SWISSGRIDZ", Europe::Zurich),
    zone("PL", "10YPL-AREA-----S", Europe::Warsaw),
    zone("CZ", "10YCZ-CEPS-----N", Europe::Prague),
    zone("SK", "10YSK-SEPS-----K", Europe::Bratislava),
    zone("HU", "10YHU-MAVIR----U", Europe::Budapest),
    zone("SI", "10YSI-ELES-----O", Europe::Ljubljana),
    zone("ES", "10YES-REE------0", Europe::Madrid),
    zone("PT", "10YPT-REN------W", Europe::Lisbon),
];

impl BiddingZone {
    pub fn by_code(code: &str) -> Option<&'static BiddingZone> {
        let normalized = code.trim().to_uppercase().replace('-', "_");
        BIDDING_ZONES.iter().find(|z| z.code == normalized)
    }

    pub fn by_eic(eic: &str) -> Option<&'static BiddingZone> {
        BIDDING_ZONES.iter().find(|z| z.eic == eic.trim())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ZoneError {
    #[error("unknown bidding zone '{0}'")]
    Unknown(String),

    #[error("EIC area '{0}' is not in the zone table, a timezone must be configured")]
    MissingTimezone(String),
}

/// Identifies the bidding zone whose prices are tracked.
///
/// `code` is what the store tags points with; `eic` is what the price source
/// is queried with; `timezone` is the zone's local time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesKey {
    code: String,
    eic: String,
    timezone: Tz,
}

impl SeriesKey {
    /// Resolve a configured location (zone code or raw EIC code).
    ///
    /// `timezone` overrides the table's zone, and is required for EIC codes
    /// the table does not know.
    pub fn resolve(location: &str, timezone: Option<Tz>) -> Result<Self, ZoneError> {
        if let Some(zone) = BiddingZone::by_eic(location).or_else(|| BiddingZone::by_code(location)) {
            return Ok(Self {
                code: zone.code.to_owned(),
                eic: zone.eic.to_owned(),
                timezone: timezone.unwrap_or(zone.timezone),
            });
        }

        let raw = location.trim();
        if looks_like_eic(raw) {
            let timezone = timezone.ok_or_else(|| ZoneError::MissingTimezone(raw.to_owned()))?;
            return Ok(Self {
                code: raw.to_owned(),
                eic: raw.to_owned(),
                timezone,
            });
        }

        Err(ZoneError::Unknown(raw.to_owned()))
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn eic(&self) -> &str {
        &self.eic
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code, self.eic)
    }
}

fn looks_like_eic(s: &str) -> bool {
    s.len() == 16 && s.starts_with("10Y") && s.is_ascii()
}
