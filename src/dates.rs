//! Timestamp parsing shared by query parameters and request bodies.
//!
//! Accepted forms: RFC 3339 (`2024-05-01T10:00:00Z`, `2024-05-01T10:00:00+02:00`),
//! a naive date-time read as UTC (`2024-05-01T10:00:00`, optional fraction), and a
//! bare date read as midnight UTC (`2024-05-01`).

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{de, Deserialize, Deserializer};

pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// `null`, a missing field and `""` all mean "no date".
pub fn deserialize_optional<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => Ok(None),
        Some(value) => parse_date(&value)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid date: {:?}", value))),
    }
}

/// For partial updates: a missing field stays `None` (via `#[serde(default)]`),
/// an explicit `null` becomes `Some(None)` and clears the value.
pub fn deserialize_nullable<'de, D>(
    deserializer: D,
) -> Result<Option<Option<DateTime<Utc>>>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_optional(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_parse_date_formats() {
        let rfc = parse_date("2024-05-01T10:30:00+02:00").unwrap();
        assert_eq!(rfc, Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap());

        let naive = parse_date("2024-05-01T10:30:00").unwrap();
        assert_eq!(naive, Utc.with_ymd_and_hms(2024, 5, 1, 10, 30, 0).unwrap());

        let date_only = parse_date(" 2024-05-01 ").unwrap();
        assert_eq!(date_only, Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap());
        assert_eq!(date_only.day(), 1);
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert!(parse_date("next tuesday").is_none());
        assert!(parse_date("2024-13-40").is_none());
        assert!(parse_date("").is_none());
    }
}
