//! Widget API - HTTP front end for the widget store
//!
//! Routes translate query and body parameters into store operations and
//! map every failure to a structured JSON error.

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod openapi;
pub mod routes;
pub mod telemetry;
pub mod types;

pub use config::{ApiConfig, MalformedRecordPolicy};
pub use db::WidgetDb;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use extractors::ApiQuery;
pub use openapi::ApiDoc;
pub use routes::create_api_router;
pub use types::{PartsParam, WidgetParams, WidgetsResponse};
