//! Serde helpers for record timestamps.
//!
//! Timestamps are written as RFC 3339 in UTC. Reading also accepts zone-less
//! ISO local date-times (`2023-12-07T10:00:00`), which are taken as UTC.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{de, Deserialize, Deserializer, Serializer};

const LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Parse a timestamp in either accepted format
pub fn parse(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Ok(dt.with_timezone(&Utc)),
        Err(_) => NaiveDateTime::parse_from_str(raw, LOCAL_FORMAT).map(|naive| naive.and_utc()),
    }
}

pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(|e| de::Error::custom(format!("invalid timestamp {raw:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_rfc3339() {
        let parsed = parse("2023-12-07T10:00:00+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2023, 12, 7, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_local_datetime_as_utc() {
        let parsed = parse("2023-12-07T10:00:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2023, 12, 7, 10, 0, 0).unwrap());

        // Microsecond fractions are kept
        let parsed = parse("2023-12-07T10:00:00.123456").unwrap();
        assert_eq!(parsed.timestamp_subsec_micros(), 123_456);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse("yesterday").is_err());
    }
}
