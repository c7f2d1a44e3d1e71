//! Widget Core - Record Type and Codecs
//!
//! The in-memory widget record plus the two representations it crosses into:
//! the flat storage tuple understood by the execution engine and the
//! stringified wire form sent to clients.
//!
//! Validation happens here and only here. The store accepts arbitrary text in
//! every column, so every widget that exists in memory has been checked by one
//! of the constructors in [`widget`].

pub mod codec;
pub mod error;
pub mod identity;
pub mod widget;
pub mod wire;

pub use codec::{StorageTuple, StorageValue};
pub use error::{RecordError, RecordResult};
pub use identity::{
    format_timestamp, new_widget_id, parse_timestamp, parse_widget_id, Timestamp, WidgetId,
};
pub use widget::{
    Widget, WidgetChanges, MAX_NAME_CHARS, MIN_NAME_CHARS, WIDGET_COLUMNS, WIDGET_COLUMN_COUNT,
};
pub use wire::WidgetWire;
