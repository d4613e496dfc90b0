//! Identity and time types for storefront items

use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Storage format of every date/time value in an item snapshot.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Date-only input accepted by date setters; normalised to midnight.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Timestamp type used for availability windows.
pub type Timestamp = NaiveDateTime;

/// Unique item identifier.
///
/// Persisted rows may carry numeric or UUID identifiers, so the ID is kept
/// as an opaque string and compared verbatim.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<i64> for ItemId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

/// Generate a new UUIDv7 item ID (timestamp-sortable).
pub fn new_item_id() -> ItemId {
    ItemId(Uuid::now_v7().to_string())
}

/// Current UTC time without offset, as compared against stored dates.
pub fn now() -> Timestamp {
    Utc::now().naive_utc()
}

/// Current UTC time in storage format.
pub fn now_string() -> String {
    format_datetime(&now())
}

pub fn format_datetime(ts: &Timestamp) -> String {
    ts.format(DATETIME_FORMAT).to_string()
}

/// Parse a stored date/time, accepting a bare date as midnight.
pub fn parse_datetime(value: &str) -> Option<Timestamp> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, DATETIME_FORMAT)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, DATE_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_item_id_is_v7() {
        let id = new_item_id();
        let parsed = Uuid::parse_str(id.as_str()).unwrap();
        assert_eq!(parsed.get_version_num(), 7);
    }

    #[test]
    fn test_parse_datetime_accepts_date_only() {
        let ts = parse_datetime("2018-01-01").unwrap();
        assert_eq!(format_datetime(&ts), "2018-01-01 00:00:00");
    }

    #[test]
    fn test_parse_datetime_rejects_invalid_month() {
        assert!(parse_datetime("2008-34-12").is_none());
        assert!(parse_datetime("2008-12-34 10:00:00").is_none());
    }

    #[test]
    fn test_item_id_from_number() {
        assert_eq!(ItemId::from(15).as_str(), "15");
    }
}
