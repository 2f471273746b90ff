//! Time utilities

use chrono::{DateTime, Duration, NaiveDateTime, Utc};

/// Layout the backend uses for its local date-times
const BACKEND_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Get current UTC time
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Get the current wall-clock time without an offset, comparable to backend timestamps
pub fn now_local() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// Parse a backend timestamp.
///
/// The backend emits local date-times (`2024-01-15T12:00:00` with optional
/// fractional seconds). RFC 3339 strings are accepted too and reduced to
/// their UTC wall-clock value.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, BACKEND_DATETIME_FORMAT)
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc).naive_utc())
                .ok()
        })
}

/// Format a backend timestamp the way the backend writes it
pub fn format_datetime(dt: &NaiveDateTime) -> String {
    dt.format(BACKEND_DATETIME_FORMAT).to_string()
}

/// Format a duration as a human-readable string
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.num_seconds();

    if total_seconds < 0 {
        return "0s".to_string();
    }

    let days = total_seconds / 86400;
    let hours = (total_seconds % 86400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    let mut parts = Vec::new();

    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 {
        parts.push(format!("{}m", minutes));
    }
    if seconds > 0 || parts.is_empty() {
        parts.push(format!("{}s", seconds));
    }

    parts.join(" ")
}

/// Calculate time until a future datetime
pub fn time_until(target: NaiveDateTime, now: NaiveDateTime) -> Option<Duration> {
    if target > now { Some(target - now) } else { None }
}

/// Check if `now` lies between two datetimes (inclusive)
pub fn is_between(start: NaiveDateTime, end: NaiveDateTime, now: NaiveDateTime) -> bool {
    now >= start && now <= end
}

/// Serde adapter for backend date-times
pub mod backend_datetime {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(dt: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_datetime(dt))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_datetime(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid datetime: {raw}")))
    }

    /// Same as the parent module for nullable fields
    pub mod option {
        use chrono::NaiveDateTime;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S>(dt: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match dt {
                Some(dt) => serializer.serialize_str(&super::super::format_datetime(dt)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
        where
            D: Deserializer<'de>,
        {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) => super::super::parse_datetime(&raw)
                    .map(Some)
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid datetime: {raw}"))),
                None => Ok(None),
            }
        }
    }
}
