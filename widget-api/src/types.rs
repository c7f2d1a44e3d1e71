//! Request and response types for the widget routes.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use widget_core::{Widget, WidgetId, WidgetWire};

use crate::error::{ApiError, ApiResult};

// ============================================================================
// REQUEST PARAMETERS
// ============================================================================

/// A part count as sent by clients: a JSON integer or a decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PartsParam {
    Count(i64),
    Text(String),
}

impl PartsParam {
    pub fn parse(&self) -> ApiResult<i64> {
        match self {
            PartsParam::Count(n) => Ok(*n),
            PartsParam::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| ApiError::invalid_format("parts", "an integer")),
        }
    }
}

/// Widget fields accepted from the query string or a JSON body.
/// Unrecognized fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WidgetParams {
    /// Widget id. `uuid` is accepted as an alias.
    #[serde(default, alias = "uuid")]
    #[param(value_type = Option<String>, format = Uuid)]
    pub id: Option<String>,

    /// Widget name, 1 to 64 characters.
    #[serde(default)]
    pub name: Option<String>,

    /// Part count.
    #[serde(default)]
    #[param(value_type = Option<i64>)]
    #[schema(value_type = Option<i64>)]
    pub parts: Option<PartsParam>,
}

/// Which rows a read selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    All,
    ById(WidgetId),
    ByName(String),
}

impl WidgetParams {
    /// Parse an optional JSON body. An empty body means no fields.
    pub fn from_body(body: &[u8]) -> ApiResult<Option<Self>> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(body)?))
    }

    /// Fill fields absent here from `body`.
    pub fn merge(self, body: Option<WidgetParams>) -> Self {
        match body {
            None => self,
            Some(body) => Self {
                id: self.id.or(body.id),
                name: self.name.or(body.name),
                parts: self.parts.or(body.parts),
            },
        }
    }

    /// Apply the id from the request path. A different id in the query or
    /// body is rejected.
    pub fn with_path_id(mut self, path_id: String) -> ApiResult<Self> {
        if let Some(existing) = self.id.as_deref() {
            if parse_id(existing)? != parse_id(&path_id)? {
                return Err(ApiError::invalid_input(format!(
                    "Path id {} does not match parameter id {}",
                    path_id, existing
                )));
            }
        }
        self.id = Some(path_id);
        Ok(self)
    }

    pub fn id(&self) -> ApiResult<Option<WidgetId>> {
        self.id.as_deref().map(parse_id).transpose()
    }

    pub fn require_id(&self) -> ApiResult<WidgetId> {
        self.id()?.ok_or_else(|| ApiError::missing_field("id"))
    }

    pub fn parts(&self) -> ApiResult<Option<i64>> {
        self.parts.as_ref().map(PartsParam::parse).transpose()
    }

    pub fn require_name(&self) -> ApiResult<&str> {
        self.name
            .as_deref()
            .ok_or_else(|| ApiError::missing_field("name"))
    }

    pub fn require_parts(&self) -> ApiResult<i64> {
        self.parts()?.ok_or_else(|| ApiError::missing_field("parts"))
    }

    /// Resolve a read. Supplying both `id` and `name` is ambiguous.
    pub fn lookup(&self) -> ApiResult<Lookup> {
        match (self.id()?, &self.name) {
            (Some(_), Some(_)) => Err(ApiError::ambiguous_query()),
            (Some(id), None) => Ok(Lookup::ById(id)),
            (None, Some(name)) => Ok(Lookup::ByName(name.clone())),
            (None, None) => Ok(Lookup::All),
        }
    }
}

fn parse_id(raw: &str) -> ApiResult<WidgetId> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::invalid_format("id", "a UUID"))
}

// ============================================================================
// RESPONSES
// ============================================================================

/// Every widget route responds with this shape, including empty results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WidgetsResponse {
    pub widgets: Vec<WidgetWire>,
}

impl From<Vec<Widget>> for WidgetsResponse {
    fn from(widgets: Vec<Widget>) -> Self {
        Self {
            widgets: widgets.iter().map(Widget::to_wire).collect(),
        }
    }
}

impl From<Widget> for WidgetsResponse {
    fn from(widget: Widget) -> Self {
        Self {
            widgets: vec![widget.to_wire()],
        }
    }
}
