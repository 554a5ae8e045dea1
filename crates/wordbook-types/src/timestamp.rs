//! Serde helpers for `savedAt`-style timestamps.
//!
//! Timestamps are written as RFC 3339 with millisecond precision and a `Z`
//! suffix. On read, strings and epoch milliseconds are accepted; anything
//! missing or unreadable becomes the current time. Every timestamp produced
//! here is truncated to milliseconds, the precision every store keeps.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, SubsecRound, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Value;

pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(value))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce(&value))
}

/// Current time at stored precision
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

pub fn format(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a persisted timestamp string
pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc).trunc_subsecs(3));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc().trunc_subsecs(3))
}

/// Parse or fall back to now
pub fn parse_or_now(raw: Option<&str>) -> DateTime<Utc> {
    raw.and_then(parse).unwrap_or_else(now)
}

fn coerce(value: &Value) -> DateTime<Utc> {
    match value {
        Value::String(raw) => parse_or_now(Some(raw)),
        Value::Number(millis) => millis
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .unwrap_or_else(now),
        _ => now(),
    }
}
