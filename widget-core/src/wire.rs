//! Client-facing wire representation

use serde::{Deserialize, Serialize};

use crate::error::{RecordError, RecordResult};
use crate::identity::{format_timestamp, parse_timestamp, parse_widget_id};
use crate::widget::Widget;

/// A widget as sent to clients. Every field is a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct WidgetWire {
    #[cfg_attr(feature = "openapi", schema(format = "uuid"))]
    pub id: String,
    pub name: String,
    /// Quantity, rendered as a decimal integer.
    pub parts: String,
    #[cfg_attr(feature = "openapi", schema(format = "date-time"))]
    pub created: String,
    #[cfg_attr(feature = "openapi", schema(format = "date-time"))]
    pub updated: String,
}

impl Widget {
    pub fn to_wire(&self) -> WidgetWire {
        WidgetWire {
            id: self.id().to_string(),
            name: self.name().to_string(),
            parts: self.quantity().to_string(),
            created: format_timestamp(&self.created_at()),
            updated: format_timestamp(&self.updated_at()),
        }
    }

    /// Parse and validate a wire record.
    pub fn from_wire(wire: &WidgetWire) -> RecordResult<Self> {
        let quantity = wire.parts.trim().parse::<i64>().map_err(|e| {
            RecordError::malformed("parts", format!("invalid integer {:?}: {e}", wire.parts))
        })?;

        Widget::from_parts(
            parse_widget_id(&wire.id)?,
            wire.name.clone(),
            quantity,
            parse_timestamp("created", &wire.created)?,
            parse_timestamp("updated", &wire.updated)?,
        )
    }
}
