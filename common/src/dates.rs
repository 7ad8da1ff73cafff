// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.

//! Lenient timestamp parsing for request bodies and query strings.
//!
//! Clients send either full RFC 3339 timestamps or the bare `YYYY-MM-DD`
//! produced by HTML date inputs. A bare date is read as UTC midnight, except
//! when it closes an inclusive range, where it covers the whole day.
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Deserializer};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a timestamp, reading a bare date as the start of that day (UTC).
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    parse_with(raw, NaiveTime::MIN)
}

/// Parses the upper bound of an inclusive range. A bare date covers the
/// whole day, up to its last representable instant.
pub fn parse_range_end(raw: &str) -> Option<DateTime<Utc>> {
    let end_of_day = NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999)?;
    parse_with(raw, end_of_day)
}

fn parse_with(raw: &str, bare_date_time: NaiveTime) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .map(|date| date.and_time(bare_date_time).and_utc())
}

fn parse_or_err<E: serde::de::Error>(
    raw: &str,
    parse: fn(&str) -> Option<DateTime<Utc>>,
) -> Result<Option<DateTime<Utc>>, E> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse(raw)
        .map(Some)
        .ok_or_else(|| E::custom(format!("invalid date '{raw}'")))
}

/// `Option<DateTime>` field where `null`, absence and `""` all mean "unset".
pub fn optional_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse_or_err(&raw, parse_datetime),
        None => Ok(None),
    }
}

/// Patch field: absent stays `None` (via `#[serde(default)]`), while an
/// explicit `null` or `""` becomes `Some(None)` and clears the value.
pub fn patch_datetime<'de, D>(deserializer: D) -> Result<Option<Option<DateTime<Utc>>>, D::Error>
where
    D: Deserializer<'de>,
{
    optional_datetime(deserializer).map(Some)
}

/// Inclusive upper range bound taken from a query string.
pub fn range_end<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse_or_err(&raw, parse_range_end),
        None => Ok(None),
    }
}
