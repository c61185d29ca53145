//! Lenient deserialisation helpers for form-shaped input.
//!
//! Form state and backend records both carry "unset" as an empty string, a `null`, or a missing
//! key. These helpers fold all three into `None` or an empty value so the typed model only ever
//! sees one representation.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use std::fmt::Display;
use std::str::FromStr;

/// Deserialize an optional coded value, treating `null` and blank strings as `None`.
pub(crate) fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(D::Error::custom),
    }
}

/// Deserialize a string that the backend may send as a number, a string, or `null`.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Null => Ok(String::new()),
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Bool(b) => Ok(b.to_string()),
        other => Err(D::Error::custom(format!(
            "expected string or number, found {other}"
        ))),
    }
}

/// Deserialize a list, falling back to an empty list when the value is not an array.
pub(crate) fn list_or_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Array(_) => serde_json::from_value(value).map_err(D::Error::custom),
        _ => Ok(Vec::new()),
    }
}

/// Deserialize an optional calendar date, accepting `YYYY-MM-DD` or a full ISO timestamp.
pub(crate) fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_iso_date(value)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid date: {value}"))),
    }
}

/// Deserialize an optional local date-time as produced by a `datetime-local` input.
pub(crate) fn optional_datetime<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_iso_datetime(value)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid date-time: {value}"))),
    }
}

/// Parse a date from `YYYY-MM-DD`, an RFC 3339 timestamp, or a naive ISO timestamp.
///
/// Returns `None` when the input matches none of these forms.
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_iso_datetime(value).map(|dt| dt.date()))
}

/// Parse a date-time from an RFC 3339 timestamp or a naive ISO timestamp with optional seconds.
///
/// Timestamps carrying an offset keep their wall-clock time in that offset, so the calendar
/// date is the one the record was written in.
///
/// Returns `None` when the input matches none of these forms.
pub fn parse_iso_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}
