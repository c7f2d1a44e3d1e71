//! Storage tuple codec
//!
//! The execution engine only understands flat, ordered value sequences. This
//! module converts between those and [`Widget`]. Encoding is total; decoding
//! re-parses every field because the store itself does no type checking.

use crate::error::{RecordError, RecordResult};
use crate::identity::{format_timestamp, parse_timestamp, parse_widget_id};
use crate::widget::{Widget, WIDGET_COLUMN_COUNT};

/// One primitive value as the store sees it.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl StorageValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            StorageValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Short type name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            StorageValue::Null => "null",
            StorageValue::Integer(_) => "integer",
            StorageValue::Real(_) => "real",
            StorageValue::Text(_) => "text",
            StorageValue::Blob(_) => "blob",
        }
    }
}

impl From<&str> for StorageValue {
    fn from(value: &str) -> Self {
        StorageValue::Text(value.to_string())
    }
}

impl From<String> for StorageValue {
    fn from(value: String) -> Self {
        StorageValue::Text(value)
    }
}

impl From<i64> for StorageValue {
    fn from(value: i64) -> Self {
        StorageValue::Integer(value)
    }
}

/// A full stored row: `(id, name, quantity, created_at, updated_at)`.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageTuple([StorageValue; WIDGET_COLUMN_COUNT]);

impl StorageTuple {
    pub fn new(values: [StorageValue; WIDGET_COLUMN_COUNT]) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[StorageValue] {
        &self.0
    }

    /// The primary-key position.
    pub fn key(&self) -> &StorageValue {
        &self.0[0]
    }

    pub fn into_inner(self) -> [StorageValue; WIDGET_COLUMN_COUNT] {
        self.0
    }
}

impl TryFrom<Vec<StorageValue>> for StorageTuple {
    type Error = RecordError;

    fn try_from(values: Vec<StorageValue>) -> Result<Self, Self::Error> {
        let got = values.len();
        <[StorageValue; WIDGET_COLUMN_COUNT]>::try_from(values)
            .map(Self)
            .map_err(|_| {
                RecordError::malformed(
                    "row",
                    format!("expected {WIDGET_COLUMN_COUNT} columns, got {got}"),
                )
            })
    }
}

impl Widget {
    /// Encode for storage.
    pub fn to_tuple(&self) -> StorageTuple {
        StorageTuple([
            StorageValue::Text(self.id().to_string()),
            StorageValue::Text(self.name().to_string()),
            StorageValue::Integer(self.quantity()),
            StorageValue::Text(format_timestamp(&self.created_at())),
            StorageValue::Text(format_timestamp(&self.updated_at())),
        ])
    }

    /// Decode a stored row, re-validating every field.
    pub fn from_tuple(tuple: &StorageTuple) -> RecordResult<Self> {
        let [id, name, quantity, created_at, updated_at] = &tuple.0;

        let id = parse_widget_id(expect_text("id", id)?)?;
        let name = match name {
            StorageValue::Text(s) => s.clone(),
            StorageValue::Integer(n) => n.to_string(),
            other => return Err(unexpected("name", other)),
        };
        let quantity = decode_integer("quantity", quantity)?;
        let created_at = parse_timestamp("created_at", expect_text("created_at", created_at)?)?;
        let updated_at = match updated_at {
            StorageValue::Null => created_at,
            other => parse_timestamp("updated_at", expect_text("updated_at", other)?)?,
        };

        Widget::from_parts(id, name, quantity, created_at, updated_at)
    }
}

fn expect_text<'a>(field: &'static str, value: &'a StorageValue) -> RecordResult<&'a str> {
    value.as_text().ok_or_else(|| unexpected(field, value))
}

fn decode_integer(field: &'static str, value: &StorageValue) -> RecordResult<i64> {
    match value {
        StorageValue::Integer(n) => Ok(*n),
        StorageValue::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|e| RecordError::malformed(field, format!("invalid integer {s:?}: {e}"))),
        other => Err(unexpected(field, other)),
    }
}

fn unexpected(field: &'static str, value: &StorageValue) -> RecordError {
    RecordError::malformed(field, format!("unexpected {} value", value.kind()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Timestamp;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn epoch() -> Timestamp {
        Utc.timestamp_opt(0, 0).single().expect("valid instant")
    }

    fn dummy() -> Widget {
        Widget::from_parts(Uuid::nil(), "dummy", 9999, epoch(), epoch()).expect("valid widget")
    }

    fn text(s: &str) -> StorageValue {
        StorageValue::Text(s.to_string())
    }

    #[test]
    fn test_to_tuple_layout() {
        let tuple = dummy().to_tuple();
        assert_eq!(
            tuple.as_slice(),
            &[
                text("00000000-0000-0000-0000-000000000000"),
                text("dummy"),
                StorageValue::Integer(9999),
                text("1970-01-01T00:00:00Z"),
                text("1970-01-01T00:00:00Z"),
            ]
        );
        assert_eq!(tuple.key(), &text("00000000-0000-0000-0000-000000000000"));
    }

    #[test]
    fn test_from_tuple_accepts_textual_quantity() -> RecordResult<()> {
        let tuple = StorageTuple::new([
            text("00000000-0000-0000-0000-000000000000"),
            text("dummy"),
            text("9999"),
            text("1970-01-01T00:00:00+00:00"),
            text("1970-01-01T00:00:00+00:00"),
        ]);
        assert_eq!(Widget::from_tuple(&tuple)?, dummy());
        Ok(())
    }

    #[test]
    fn test_from_tuple_null_updated_falls_back_to_created() -> RecordResult<()> {
        let mut values = dummy().to_tuple().into_inner();
        values[4] = StorageValue::Null;
        let widget = Widget::from_tuple(&StorageTuple::new(values))?;
        assert_eq!(widget.updated_at(), widget.created_at());
        Ok(())
    }

    #[test]
    fn test_from_tuple_rejects_bad_fields() {
        let cases: [(usize, StorageValue, &str); 5] = [
            (0, text("nope"), "id"),
            (2, text("many"), "quantity"),
            (2, StorageValue::Real(1.5), "quantity"),
            (3, text("then"), "created_at"),
            (4, StorageValue::Integer(5), "updated_at"),
        ];

        for (position, value, field) in cases {
            let mut values = dummy().to_tuple().into_inner();
            values[position] = value;
            let err = Widget::from_tuple(&StorageTuple::new(values));
            assert!(
                matches!(err, Err(RecordError::Malformed { field: f, .. }) if f == field),
                "expected malformed {field}, got {err:?}"
            );
        }
    }

    #[test]
    fn test_from_tuple_revalidates_name() {
        let mut values = dummy().to_tuple().into_inner();
        values[1] = text(&"z".repeat(65));
        let err = Widget::from_tuple(&StorageTuple::new(values));
        assert!(matches!(err, Err(RecordError::InvalidName { len: 65, .. })));
    }

    #[test]
    fn test_tuple_arity_is_checked() {
        let short = vec![text("a"), text("b")];
        let err = StorageTuple::try_from(short);
        assert!(matches!(err, Err(RecordError::Malformed { field: "row", .. })));
    }
}

// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================

#[cfg(test)]
mod prop_tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;
    use uuid::Uuid;

    fn arb_widget() -> impl Strategy<Value = Widget> {
        (
            any::<u128>(),
            "[a-zA-Z0-9 _\\-é]{1,64}",
            any::<i64>(),
            0i64..4_102_444_800,
            0u32..1_000_000_000,
            0i64..1_000_000_000,
        )
            .prop_map(|(id, name, quantity, secs, nanos, delta)| {
                let created = Utc
                    .timestamp_opt(secs, nanos)
                    .single()
                    .expect("in-range instant");
                let updated = created + chrono::Duration::milliseconds(delta);
                Widget::from_parts(Uuid::from_u128(id), name, quantity, created, updated)
                    .expect("generated widget is valid")
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Decoding an encoded widget yields the same widget.
        #[test]
        fn prop_tuple_round_trip(widget in arb_widget()) {
            let decoded = Widget::from_tuple(&widget.to_tuple());
            prop_assert_eq!(decoded, Ok(widget));
        }
    }
}
