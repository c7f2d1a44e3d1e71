//! Identity and timestamp types for widgets

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::error::{RecordError, RecordResult};

/// Widget identifier using UUIDv7 for timestamp-sortable IDs.
pub type WidgetId = Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Generate a new UUIDv7 WidgetId (timestamp-sortable).
pub fn new_widget_id() -> WidgetId {
    Uuid::now_v7()
}

/// Render a timestamp as RFC 3339 text.
///
/// Uses a `Z` suffix and only as many fractional digits as the value needs,
/// so [`parse_timestamp`] recovers the exact same instant.
pub fn format_timestamp(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parse RFC 3339 text with any offset, normalized to UTC.
pub fn parse_timestamp(field: &'static str, raw: &str) -> RecordResult<Timestamp> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| RecordError::malformed(field, format!("invalid timestamp {raw:?}: {e}")))
}

/// Parse a hyphenated (or simple) UUID.
pub fn parse_widget_id(raw: &str) -> RecordResult<WidgetId> {
    Uuid::parse_str(raw.trim())
        .map_err(|e| RecordError::malformed("id", format!("invalid uuid {raw:?}: {e}")))
}
