//! Lenient timestamp parsing shared by the domain types and query params.
//!
//! Peers and callers send timestamps in several shapes: full RFC 3339, a
//! naive `YYYY-MM-DDTHH:MM:SS[.f]` (read as UTC), or a bare date (read as
//! midnight UTC).

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
  let raw = raw.trim();
  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    return Ok(dt.with_timezone(&Utc));
  }
  if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
    return Ok(naive.and_utc());
  }
  if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
    return Ok(date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc());
  }
  Err(format!("failed to parse {raw:?} as a date or timestamp"))
}

pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = String::deserialize(deserializer)?;
  parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

pub fn deserialize_optional_timestamp<'de, D>(
  deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
  D: Deserializer<'de>,
{
  Option::<String>::deserialize(deserializer)?
    .map(|raw| parse_timestamp(&raw).map_err(serde::de::Error::custom))
    .transpose()
}
