//! Widget REST API Routes
//!
//! Parameters come from the query string. POST, PATCH and PUT also accept a
//! JSON body with the same field names, which fills fields the query string
//! leaves out. Every response body is `{"widgets": [...]}`.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use std::sync::Arc;

use widget_core::{Widget, WidgetChanges};

use crate::{
    db::WidgetDb,
    error::{ApiError, ApiResult},
    extractors::ApiQuery,
    types::{Lookup, WidgetParams, WidgetsResponse},
};

// ============================================================================
// SHARED STATE
// ============================================================================

#[derive(Clone)]
pub struct WidgetState {
    pub db: WidgetDb,
}

impl WidgetState {
    pub fn new(db: WidgetDb) -> Self {
        Self { db }
    }
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /widgets - List all widgets, or look one up by id or by name
#[utoipa::path(
    get,
    path = "/widgets",
    tag = "Widgets",
    params(WidgetParams),
    responses(
        (status = 200, description = "Matching widgets, possibly none", body = WidgetsResponse),
        (status = 400, description = "Both id and name supplied, or a bad id", body = ApiError),
        (status = 500, description = "Storage failure", body = ApiError),
    ),
)]
pub async fn list_widgets(
    State(state): State<Arc<WidgetState>>,
    ApiQuery(params): ApiQuery<WidgetParams>,
) -> ApiResult<impl IntoResponse> {
    let widgets = match params.lookup()? {
        Lookup::All => state.db.list_all().await?,
        Lookup::ById(id) => state.db.get_by_id(id).await?.into_iter().collect(),
        Lookup::ByName(name) => state.db.find_by_name(&name).await?,
    };
    Ok(Json(WidgetsResponse::from(widgets)))
}

/// GET /widgets/{id} - Get one widget
#[utoipa::path(
    get,
    path = "/widgets/{id}",
    tag = "Widgets",
    params(
        ("id" = String, Path, description = "Widget id"),
    ),
    responses(
        (status = 200, description = "The widget", body = WidgetsResponse),
        (status = 400, description = "Malformed id", body = ApiError),
        (status = 404, description = "No widget with this id", body = ApiError),
    ),
)]
pub async fn get_widget(
    State(state): State<Arc<WidgetState>>,
    Path(id): Path<String>,
    ApiQuery(params): ApiQuery<WidgetParams>,
) -> ApiResult<impl IntoResponse> {
    let params = params.with_path_id(id)?;
    let Lookup::ById(id) = params.lookup()? else {
        return Err(ApiError::ambiguous_query());
    };
    let widget = state
        .db
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::widget_not_found(id))?;
    Ok(Json(WidgetsResponse::from(widget)))
}

/// POST /widgets - Create a widget with a fresh id
#[utoipa::path(
    post,
    path = "/widgets",
    tag = "Widgets",
    params(WidgetParams),
    request_body(content = WidgetParams, description = "Optional; fills fields absent from the query string"),
    responses(
        (status = 201, description = "Widget created", body = WidgetsResponse),
        (status = 400, description = "Missing or invalid name or parts", body = ApiError),
        (status = 409, description = "Id collision", body = ApiError),
    ),
)]
pub async fn create_widget(
    State(state): State<Arc<WidgetState>>,
    ApiQuery(params): ApiQuery<WidgetParams>,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let params = params.merge(WidgetParams::from_body(&body)?);

    let name = params.require_name()?;
    let parts = params.require_parts()?;
    let widget = Widget::new(name, parts)?;

    let created = state.db.create(&widget).await?;
    tracing::info!(id = %created.id(), "Widget created");

    Ok((StatusCode::CREATED, Json(WidgetsResponse::from(created))))
}

/// PATCH|PUT /widgets - Change the name and/or parts of a widget
#[utoipa::path(
    method(patch, put),
    path = "/widgets",
    tag = "Widgets",
    params(WidgetParams),
    request_body(content = WidgetParams, description = "Optional; fills fields absent from the query string"),
    responses(
        (status = 200, description = "Widget as updated", body = WidgetsResponse),
        (status = 400, description = "Missing id, nothing to change, or invalid values", body = ApiError),
        (status = 404, description = "No widget with this id", body = ApiError),
        (status = 500, description = "Stored record is malformed", body = ApiError),
    ),
)]
pub async fn update_widget(
    State(state): State<Arc<WidgetState>>,
    ApiQuery(params): ApiQuery<WidgetParams>,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let params = params.merge(WidgetParams::from_body(&body)?);
    apply_update(&state.db, &params).await
}

/// PATCH|PUT /widgets/{id} - Change the name and/or parts of a widget
#[utoipa::path(
    method(patch, put),
    path = "/widgets/{id}",
    tag = "Widgets",
    params(
        ("id" = String, Path, description = "Widget id"),
    ),
    request_body(content = WidgetParams, description = "Optional; fills fields absent from the query string"),
    responses(
        (status = 200, description = "Widget as updated", body = WidgetsResponse),
        (status = 400, description = "Conflicting ids, nothing to change, or invalid values", body = ApiError),
        (status = 404, description = "No widget with this id", body = ApiError),
    ),
)]
pub async fn update_widget_by_path(
    State(state): State<Arc<WidgetState>>,
    Path(id): Path<String>,
    ApiQuery(params): ApiQuery<WidgetParams>,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let params = params
        .merge(WidgetParams::from_body(&body)?)
        .with_path_id(id)?;
    apply_update(&state.db, &params).await
}

/// DELETE /widgets - Delete a widget
#[utoipa::path(
    delete,
    path = "/widgets",
    tag = "Widgets",
    params(WidgetParams),
    responses(
        (status = 200, description = "Widget deleted; the list is empty", body = WidgetsResponse),
        (status = 400, description = "Missing or malformed id", body = ApiError),
        (status = 404, description = "No widget with this id", body = ApiError),
    ),
)]
pub async fn delete_widget(
    State(state): State<Arc<WidgetState>>,
    ApiQuery(params): ApiQuery<WidgetParams>,
) -> ApiResult<impl IntoResponse> {
    apply_delete(&state.db, &params).await
}

/// DELETE /widgets/{id} - Delete a widget
#[utoipa::path(
    delete,
    path = "/widgets/{id}",
    tag = "Widgets",
    params(
        ("id" = String, Path, description = "Widget id"),
    ),
    responses(
        (status = 200, description = "Widget deleted; the list is empty", body = WidgetsResponse),
        (status = 404, description = "No widget with this id", body = ApiError),
    ),
)]
pub async fn delete_widget_by_path(
    State(state): State<Arc<WidgetState>>,
    Path(id): Path<String>,
    ApiQuery(params): ApiQuery<WidgetParams>,
) -> ApiResult<impl IntoResponse> {
    apply_delete(&state.db, &params.with_path_id(id)?).await
}

// ============================================================================
// SHARED LOGIC
// ============================================================================

/// Load, derive, persist. Only `name` and `parts` change; `updated_at` is
/// refreshed.
async fn apply_update(db: &WidgetDb, params: &WidgetParams) -> ApiResult<Json<WidgetsResponse>> {
    let id = params.require_id()?;
    let changes = WidgetChanges {
        name: params.name.clone(),
        quantity: params.parts()?,
    };
    if changes.is_empty() {
        return Err(ApiError::invalid_input(
            "Nothing to update: supply name and/or parts",
        ));
    }

    let current = db.load(id).await?;
    let replacement = current.with_changes(changes, Utc::now())?;

    // A concurrent delete can win between the load and the write.
    let updated = db
        .update(&replacement)
        .await?
        .ok_or_else(|| ApiError::widget_not_found(id))?;
    tracing::debug!(%id, "Widget updated");

    Ok(Json(WidgetsResponse::from(updated)))
}

async fn apply_delete(db: &WidgetDb, params: &WidgetParams) -> ApiResult<Json<WidgetsResponse>> {
    let id = params.require_id()?;
    db.check_existence(id).await?;
    let remaining = db.delete(id).await?;
    tracing::info!(%id, "Widget deleted");
    Ok(Json(WidgetsResponse::from(remaining)))
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router(db: WidgetDb) -> Router {
    let state = Arc::new(WidgetState::new(db));

    Router::new()
        .route(
            "/widgets",
            get(list_widgets)
                .post(create_widget)
                .patch(update_widget)
                .put(update_widget)
                .delete(delete_widget),
        )
        .route(
            "/widgets/:id",
            get(get_widget)
                .patch(update_widget_by_path)
                .put(update_widget_by_path)
                .delete(delete_widget_by_path),
        )
        .with_state(state)
}
