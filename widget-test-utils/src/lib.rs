//! Widget Test Utilities
//!
//! Centralized test infrastructure for the workspace:
//! - Fixtures for the well-known dummy records
//! - Proptest generators for widgets
//! - Temporary stores backed by a throwaway directory

pub use widget_core::{
    StorageTuple, StorageValue, Timestamp, Widget, WidgetChanges, WidgetId, WidgetWire,
};
pub use widget_storage::{Operation, StoreConfig, WidgetStore};

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use tempfile::TempDir;
use uuid::Uuid;

// ============================================================================
// FIXTURES
// ============================================================================

/// 1970-01-01T00:00:00Z
pub fn unix_epoch() -> Timestamp {
    Utc.timestamp_opt(0, 0)
        .single()
        .expect("epoch is a valid instant")
}

/// 1997-09-01T00:00:00Z
pub fn end_day() -> Timestamp {
    Utc.with_ymd_and_hms(1997, 9, 1, 0, 0, 0)
        .single()
        .expect("end day is a valid instant")
}

/// 00000000-0000-0000-0000-000000000000
pub fn zeroes_id() -> WidgetId {
    Uuid::nil()
}

/// 11111111-1111-1111-1111-111111111111
pub fn ones_id() -> WidgetId {
    Uuid::from_u128(0x1111_1111_1111_1111_1111_1111_1111_1111)
}

/// An obviously fake widget: zero id, "dummy", 9999 parts, stamped at the epoch.
pub fn dummy_widget() -> Widget {
    Widget::from_parts(zeroes_id(), "dummy", 9999, unix_epoch(), unix_epoch())
        .expect("dummy widget is valid")
}

/// The dummy widget under the all-ones id.
pub fn another_widget() -> Widget {
    Widget::from_parts(ones_id(), "dummy", 9999, unix_epoch(), unix_epoch())
        .expect("another widget is valid")
}

/// The dummy widget after its parts were changed on [`end_day`].
pub fn updated_dummy_widget() -> Widget {
    dummy_widget()
        .with_changes(
            WidgetChanges {
                name: None,
                quantity: Some(7777),
            },
            end_day(),
        )
        .expect("updated dummy widget is valid")
}

// ============================================================================
// TEMPORARY STORES
// ============================================================================

/// A store in its own temporary directory. The directory, and the database
/// file in it, are removed on drop.
pub struct TestStore {
    pub store: WidgetStore,
    pub dir: TempDir,
}

impl TestStore {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("TempDir creation should succeed");
        let config = StoreConfig::with_path(dir.path().join("widgets_test.db"));
        let store = WidgetStore::open(config).expect("default test config is valid");
        Self { store, dir }
    }

    pub fn config(&self) -> &StoreConfig {
        self.store.config()
    }

    /// Insert `widget`, panicking on failure.
    pub fn insert(&self, widget: &Widget) -> Vec<StorageTuple> {
        self.store
            .execute(Operation::Insert, Some(widget.to_tuple().as_slice()))
            .expect("insert should succeed")
    }

    /// Decode every stored row, panicking on malformed rows.
    pub fn all_widgets(&self) -> Vec<Widget> {
        self.store
            .execute(Operation::SelectAll, None)
            .expect("select_all should succeed")
            .iter()
            .map(|tuple| Widget::from_tuple(tuple).expect("stored row should decode"))
            .collect()
    }
}

impl Default for TestStore {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// GENERATORS
// ============================================================================

/// Names within the allowed length, including some multi-byte characters.
pub fn arb_widget_name() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Za-z][a-z]{0,15}",
        "[a-z ]{1,64}",
        "[αβγδ]{1,64}",
        Just("x".repeat(64)),
    ]
}

/// Names longer than the allowed maximum.
pub fn arb_long_name() -> impl Strategy<Value = String> {
    "[a-z]{65,100}"
}

pub fn arb_quantity() -> impl Strategy<Value = i64> {
    prop_oneof![0i64..10_000, any::<i64>()]
}

/// Instants between the epoch and 2100, with nanosecond precision.
pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
    (0i64..4_102_444_800, 0u32..1_000_000_000).prop_map(|(secs, nanos)| {
        Utc.timestamp_opt(secs, nanos)
            .single()
            .expect("in-range instant")
    })
}

/// Any valid widget.
pub fn arb_widget() -> impl Strategy<Value = Widget> {
    (
        any::<u128>(),
        arb_widget_name(),
        arb_quantity(),
        arb_timestamp(),
        0i64..86_400_000,
    )
        .prop_map(|(id, name, quantity, created, delta_ms)| {
            Widget::from_parts(
                Uuid::from_u128(id),
                name,
                quantity,
                created,
                created + Duration::milliseconds(delta_ms),
            )
            .expect("generated widget is valid")
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_match_known_values() {
        let dummy = dummy_widget();
        assert_eq!(dummy.id().to_string(), "00000000-0000-0000-0000-000000000000");
        assert_eq!(
            another_widget().id().to_string(),
            "11111111-1111-1111-1111-111111111111"
        );
        assert_eq!(updated_dummy_widget().quantity(), 7777);
        assert_eq!(updated_dummy_widget().updated_at(), end_day());
        assert_eq!(updated_dummy_widget().created_at(), unix_epoch());
    }

    #[test]
    fn test_store_lives_in_temp_dir() {
        let store = TestStore::new();
        assert!(store.config().path.starts_with(store.dir.path()));
        assert!(store.all_widgets().is_empty());
    }
}
