//! Timestamp utilities
//!
//! All timestamps are persisted as RFC 3339 text.

use chrono::{DateTime, Utc};

use crate::{Error, Result};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Format a timestamp for storage
pub fn to_db(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339()
}

/// Parse a stored timestamp, naming the column in the error
pub fn from_db(column: &str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Failed to parse {}: {}", column, e)))
}

/// Parse an optional stored timestamp
pub fn from_db_opt(column: &str, value: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    value.map(|v| from_db(column, v)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_returns_recent_timestamp() {
        let timestamp = now();
        assert!(timestamp.timestamp() > 946_684_800); // 2000-01-01 00:00:00 UTC
        assert!(timestamp.timestamp() < 4_102_444_800); // 2100-01-01 00:00:00 UTC
    }

    #[test]
    fn test_db_format_preserves_instant() {
        let original = now();
        let parsed = from_db("updated_at", &to_db(&original)).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_from_db_names_column_on_error() {
        let err = from_db("finalised_at", "yesterday").unwrap_err();
        assert!(err.to_string().contains("finalised_at"));
    }

    #[test]
    fn test_from_db_opt_none() {
        assert!(from_db_opt("finalised_at", None).unwrap().is_none());
    }
}
