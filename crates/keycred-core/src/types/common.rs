use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

/// Timestamp layout Graph expects for credential validity: `yyyy-MM-ddTHH:mm:ssZ`.
pub const GRAPH_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Format a timestamp the way credential payloads carry it (second precision, `Z`).
#[must_use]
pub fn format_graph_datetime(dt: &DateTime<Utc>) -> String {
    dt.format(GRAPH_DATETIME_FORMAT).to_string()
}

/// Serde adapter for payload timestamps.
///
/// Serializes with [`GRAPH_DATETIME_FORMAT`]. Deserialization also accepts the
/// fractional-second RFC 3339 form Graph returns on reads.
pub mod graph_datetime {
    use super::{format_graph_datetime, parse_graph_datetime};
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_graph_datetime(dt))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_graph_datetime(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {s}")))
    }

    /// Optional variant for read-side resources
    pub mod option {
        use super::super::{format_graph_datetime, parse_graph_datetime};
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            dt: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match dt {
                Some(dt) => serializer.serialize_str(&format_graph_datetime(dt)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            let s = Option::<String>::deserialize(deserializer)?;
            s.map(|s| {
                parse_graph_datetime(&s)
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {s}")))
            })
            .transpose()
        }
    }
}

/// Parse a Graph timestamp, with or without fractional seconds.
#[must_use]
pub fn parse_graph_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, GRAPH_DATETIME_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// RFC 3339 rendering used in human-facing output
#[must_use]
pub fn display_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}
