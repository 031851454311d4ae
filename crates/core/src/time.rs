// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Expiry timestamp decoding
//!
//! Directory servers hand back `accountExpires` in several shapes depending on
//! the server and the client library: raw FILETIME ticks (100ns since
//! 1601-01-01 UTC), ISO-8601 strings, or already-decoded datetimes. Everything
//! is normalized to `Option<DateTime<Utc>>`, where `None` means "never expires".

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;

/// Tick value the directory uses for "never expires"
pub const NEVER_EXPIRES: i64 = i64::MAX;

const TICKS_PER_SECOND: i64 = 10_000_000;
/// Seconds between 1601-01-01T00:00:00Z and the Unix epoch
const FILETIME_EPOCH_OFFSET_SECS: i64 = 11_644_473_600;
const MILLIS_PER_DAY: i64 = 86_400_000;

/// Errors from expiry decoding
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimeError {
    #[error("unsupported expiry format: {0}")]
    UnsupportedFormat(String),
}

/// An expiry value as it arrives from the directory
#[derive(Debug, Clone, PartialEq)]
pub enum RawExpiry {
    /// FILETIME tick count
    Ticks(i64),
    /// FILETIME tick count delivered as a float
    FloatTicks(f64),
    /// ISO-8601 string (or a tick count rendered as a string)
    Text(String),
    /// Already-decoded instant
    Instant(DateTime<Utc>),
}

impl From<i64> for RawExpiry {
    fn from(ticks: i64) -> Self {
        RawExpiry::Ticks(ticks)
    }
}

impl From<&str> for RawExpiry {
    fn from(s: &str) -> Self {
        RawExpiry::Text(s.to_string())
    }
}

impl From<String> for RawExpiry {
    fn from(s: String) -> Self {
        RawExpiry::Text(s)
    }
}

impl From<DateTime<Utc>> for RawExpiry {
    fn from(dt: DateTime<Utc>) -> Self {
        RawExpiry::Instant(dt)
    }
}

/// Decode a raw expiry into an instant.
///
/// Returns `Ok(None)` for the "never expires" sentinels (`0`, `i64::MAX`),
/// non-positive tick counts and empty strings.
pub fn to_instant(raw: &RawExpiry) -> Result<Option<DateTime<Utc>>, TimeError> {
    match raw {
        RawExpiry::Instant(dt) => Ok(Some(*dt)),
        RawExpiry::Ticks(ticks) => Ok(ticks_to_instant(*ticks)),
        RawExpiry::FloatTicks(ticks) => {
            if !ticks.is_finite() {
                return Err(TimeError::UnsupportedFormat(ticks.to_string()));
            }
            // `as` saturates, so anything at or past 2^63 lands on the sentinel
            Ok(ticks_to_instant(*ticks as i64))
        }
        RawExpiry::Text(text) => parse_text(text),
    }
}

fn ticks_to_instant(ticks: i64) -> Option<DateTime<Utc>> {
    if ticks <= 0 || ticks == NEVER_EXPIRES {
        return None;
    }
    let secs = ticks / TICKS_PER_SECOND - FILETIME_EPOCH_OFFSET_SECS;
    let nanos = (ticks % TICKS_PER_SECOND) * 100;
    Utc.timestamp_opt(secs, nanos as u32).single()
}

fn parse_text(text: &str) -> Result<Option<DateTime<Utc>>, TimeError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    // accountExpires comes back over LDAP as a decimal tick string
    let digits = trimmed.strip_prefix('-').unwrap_or(trimmed);
    if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
        return trimmed
            .parse::<i64>()
            .map(ticks_to_instant)
            .map_err(|_| TimeError::UnsupportedFormat(trimmed.to_string()));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M:%S%.f%z"] {
        if let Ok(dt) = DateTime::parse_from_str(trimmed, fmt) {
            return Ok(Some(dt.with_timezone(&Utc)));
        }
    }

    // Naive values are taken as UTC; generalized time carries a trailing Z
    let naive = trimmed.strip_suffix('Z').unwrap_or(trimmed);
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y%m%d%H%M%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(naive, fmt) {
            return Ok(Some(dt.and_utc()));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(naive, "%Y-%m-%d") {
        return Ok(date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc()));
    }

    Err(TimeError::UnsupportedFormat(trimmed.to_string()))
}

/// Encode an instant as FILETIME ticks.
pub fn to_filetime(instant: DateTime<Utc>) -> i64 {
    (instant.timestamp() + FILETIME_EPOCH_OFFSET_SECS) * TICKS_PER_SECOND
        + i64::from(instant.timestamp_subsec_nanos() / 100)
}

/// Whole days from `now` until `instant`, floored (negative once overdue).
pub fn days_until(instant: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (instant - now).num_milliseconds().div_euclid(MILLIS_PER_DAY)
}

/// Date format used in reports: `31.12.2025`
pub fn format_date(instant: DateTime<Utc>) -> String {
    instant.format("%d.%m.%Y").to_string()
}

/// Calendar day of `instant` as ISO `2025-12-31`, the `{date}` placeholder
pub fn format_iso_date(instant: DateTime<Utc>) -> String {
    instant.date_naive().format("%Y-%m-%d").to_string()
}

/// Timestamp format used in reports: `31.12.2025 09:00`
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.format("%d.%m.%Y %H:%M").to_string()
}

#[cfg(test)]
#[path = "time_tests.rs"]
mod tests;
