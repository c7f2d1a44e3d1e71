//! OpenAPI Specification for the Widget API

use utoipa::OpenApi;

use crate::error::{ApiError, ErrorCode};
use crate::routes::{health, widget};
use crate::types::{WidgetParams, WidgetsResponse};
use widget_core::WidgetWire;

/// OpenAPI document for the Widget API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Widget API",
        version = "0.1.0",
        description = "Create, read, update and delete widgets stored in a single SQLite table",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:8888", description = "Local Development")
    ),
    tags(
        (name = "Widgets", description = "Widget records"),
        (name = "Health", description = "Liveness and readiness probes")
    ),
    paths(
        widget::list_widgets,
        widget::get_widget,
        widget::create_widget,
        widget::update_widget,
        widget::update_widget_by_path,
        widget::delete_widget,
        widget::delete_widget_by_path,
        health::ping,
        health::liveness,
        health::readiness,
    ),
    components(schemas(
        WidgetWire,
        WidgetsResponse,
        WidgetParams,
        ApiError,
        ErrorCode,
        health::HealthResponse,
        health::HealthStatus,
        health::HealthDetails,
        health::ComponentHealth,
    ))
)]
pub struct ApiDoc;
