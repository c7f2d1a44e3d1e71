//! The widget record

use chrono::{Duration, Utc};

use crate::error::{RecordError, RecordResult};
use crate::identity::{new_widget_id, Timestamp, WidgetId};

/// Minimum widget name length, in characters.
pub const MIN_NAME_CHARS: usize = 1;

/// Maximum widget name length, in characters.
pub const MAX_NAME_CHARS: usize = 64;

/// Number of stored columns per widget.
pub const WIDGET_COLUMN_COUNT: usize = 5;

/// Stored column names, in storage tuple order.
///
/// The query catalog renders every statement from this list, so adding a
/// field means adding it here and to the codec.
pub const WIDGET_COLUMNS: [&str; WIDGET_COLUMN_COUNT] =
    ["id", "name", "quantity", "created_at", "updated_at"];

/// One stored widget.
///
/// Fields are private so that every instance has passed validation. Updates
/// never mutate in place; see [`Widget::with_changes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Widget {
    id: WidgetId,
    name: String,
    quantity: i64,
    created_at: Timestamp,
    updated_at: Timestamp,
}

/// Fields a client may replace on an existing widget.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WidgetChanges {
    pub name: Option<String>,
    pub quantity: Option<i64>,
}

impl WidgetChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.quantity.is_none()
    }
}

impl Widget {
    /// Create a brand-new widget with a fresh id, stamped now.
    pub fn new(name: impl Into<String>, quantity: i64) -> RecordResult<Self> {
        let now = Utc::now();
        Self::from_parts(new_widget_id(), name, quantity, now, now)
    }

    /// Reconstruct a widget from its parts, validating every invariant.
    pub fn from_parts(
        id: WidgetId,
        name: impl Into<String>,
        quantity: i64,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> RecordResult<Self> {
        let name = name.into();
        validate_name(&name)?;
        if updated_at < created_at {
            return Err(RecordError::TimestampOrder {
                created_at: created_at.to_rfc3339(),
                updated_at: updated_at.to_rfc3339(),
            });
        }

        Ok(Self {
            id,
            name,
            quantity,
            created_at,
            updated_at,
        })
    }

    /// Derive the replacement for this widget.
    ///
    /// Only `name` and `quantity` can change. `updated_at` becomes `now`, or
    /// one microsecond past the previous value if the clock has not moved
    /// forward, so it always strictly increases.
    pub fn with_changes(&self, changes: WidgetChanges, now: Timestamp) -> RecordResult<Self> {
        let updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::microseconds(1)
        };

        Self::from_parts(
            self.id,
            changes.name.unwrap_or_else(|| self.name.clone()),
            changes.quantity.unwrap_or(self.quantity),
            self.created_at,
            updated_at,
        )
    }

    pub fn id(&self) -> WidgetId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }
}

fn validate_name(name: &str) -> RecordResult<()> {
    let len = name.chars().count();
    if !(MIN_NAME_CHARS..=MAX_NAME_CHARS).contains(&len) {
        return Err(RecordError::InvalidName {
            len,
            min: MIN_NAME_CHARS,
            max: MAX_NAME_CHARS,
        });
    }
    Ok(())
}
