use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn as_utc(&self) -> &DateTime<Utc> {
        &self.0
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M"))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.to_rfc3339().serialize(serializer)
    }
}

/// The upload service emits naive ISO timestamps, so anything without an offset is read as UTC.
impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;

        if let Ok(dt) = DateTime::parse_from_rfc3339(&s) {
            return Ok(Self(dt.into()));
        }

        NaiveDateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| Self(naive.and_utc()))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn offset_timestamp() {
        let ts: Timestamp = serde_json::from_str("\"2024-03-01T10:00:00+03:00\"").unwrap();
        assert_eq!(ts, Timestamp(Utc.with_ymd_and_hms(2024, 3, 1, 7, 0, 0).unwrap()));
    }

    #[test]
    fn naive_timestamp_is_utc() {
        let ts: Timestamp = serde_json::from_str("\"2024-03-01T10:00:00.123456\"").unwrap();
        assert_eq!(ts.to_string(), "2024-03-01 10:00");
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(serde_json::from_str::<Timestamp>("\"yesterday\"").is_err());
    }
}
