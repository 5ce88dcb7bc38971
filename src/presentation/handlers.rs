// HTTP request handlers
use crate::application::grid_controller::{ControllerState, GridController};
use crate::domain::tile::DashboardView;
use crate::domain::widget::{Layout, LayoutUpdate, WidgetInstance};
use crate::infrastructure::config::request_host;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::infrastructure::ndjson_stream::stream_from_receiver;
use crate::presentation::app_state::AppState;
use crate::presentation::errors::ApiError;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct AddWidgetRequest {
    #[serde(rename = "type")]
    pub widget_type: String,
}

#[derive(Serialize)]
struct LayoutDocument {
    layout: Layout,
}

/// JSON body, Brotli-compressed when the client accepts it
async fn respond<T: Serialize>(headers: &HeaderMap, data: &T) -> Response {
    match json_response(StatusCode::OK, data, accepts_brotli(headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

fn host_of(headers: &HeaderMap) -> String {
    request_host(headers.get(header::HOST).and_then(|v| v.to_str().ok()))
}

async fn ensure_mounted(controller: &mut GridController) {
    if controller.state() == ControllerState::Loading {
        controller.mount().await;
    }
}

/// Accepts `{"layout": [...]}` or a bare array of widget instances.
fn parse_layout(payload: Value) -> Result<Layout, ApiError> {
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(mut fields) => match fields.remove("layout") {
            Some(Value::Array(items)) => items,
            _ => return Err(ApiError::InvalidLayout),
        },
        _ => return Err(ApiError::InvalidLayout),
    };

    let layout: Layout =
        serde_json::from_value(Value::Array(items)).map_err(|_| ApiError::InvalidLayout)?;

    let mut ids = HashSet::new();
    if !layout.iter().all(|w| ids.insert(w.id.as_str())) {
        return Err(ApiError::InvalidLayout);
    }
    Ok(layout)
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Persisted layout, or an empty one when nothing usable is stored
pub async fn get_layout(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let layout = match state.store.load().await {
        Ok(layout) => layout.unwrap_or_default(),
        Err(e) => {
            tracing::error!("Error reading layout: {:#}", e);
            Vec::new()
        }
    };

    respond(&headers, &LayoutDocument { layout }).await
}

/// Replace the whole layout
pub async fn save_layout(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(payload) = payload.map_err(|_| ApiError::InvalidLayout)?;
    let layout = parse_layout(payload)?;

    state.controller.lock().await.replace_layout(layout).await?;
    Ok(Json(json!({ "success": true })))
}

/// Widgets available for the "add" picker
pub async fn list_widgets(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    respond(&headers, &state.registry.summaries()).await
}

/// Current dashboard view, mounting on first use
pub async fn get_dashboard(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let view = {
        let mut controller = state.controller.lock().await;
        ensure_mounted(&mut controller).await;
        controller.view()
    };
    respond(&headers, &view).await
}

/// Reload the layout from the store
pub async fn mount_dashboard(State(state): State<Arc<AppState>>) -> Json<DashboardView> {
    let mut controller = state.controller.lock().await;
    controller.mount().await;
    Json(controller.view())
}

pub async fn enter_edit(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardView>, ApiError> {
    let mut controller = state.controller.lock().await;
    controller.enter_edit()?;
    Ok(Json(controller.view()))
}

pub async fn exit_edit(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardView>, ApiError> {
    let mut controller = state.controller.lock().await;
    controller.exit_edit()?;
    Ok(Json(controller.view()))
}

pub async fn open_picker(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardView>, ApiError> {
    let mut controller = state.controller.lock().await;
    controller.open_add_picker()?;
    Ok(Json(controller.view()))
}

pub async fn close_picker(State(state): State<Arc<AppState>>) -> Json<DashboardView> {
    let mut controller = state.controller.lock().await;
    controller.close_add_picker();
    Json(controller.view())
}

/// Apply a completed drag or resize
pub async fn arrange(
    State(state): State<Arc<AppState>>,
    updates: Result<Json<Vec<LayoutUpdate>>, JsonRejection>,
) -> Result<Json<DashboardView>, ApiError> {
    let Json(updates) = updates?;
    let mut controller = state.controller.lock().await;
    controller.on_arrange(&updates).await?;
    Ok(Json(controller.view()))
}

pub async fn add_widget(
    State(state): State<Arc<AppState>>,
    request: Result<Json<AddWidgetRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<WidgetInstance>), ApiError> {
    let Json(request) = request?;
    let mut controller = state.controller.lock().await;
    let widget = controller.add_widget(&request.widget_type).await?;
    Ok((StatusCode::CREATED, Json(widget)))
}

pub async fn remove_widget(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardView>, ApiError> {
    let mut controller = state.controller.lock().await;
    controller.remove_widget(&id).await?;
    Ok(Json(controller.view()))
}

/// Load one tile's data
pub async fn get_tile(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let widget = {
        let mut controller = state.controller.lock().await;
        ensure_mounted(&mut controller).await;
        controller.layout().iter().find(|w| w.id == id).cloned()
    }
    .ok_or(ApiError::TileNotFound(id))?;

    let ctx = state.tile_service.context_for(&host_of(&headers));
    let tile = state.tile_service.load_tile(&widget, &ctx).await;
    Ok(respond(&headers, &tile).await)
}

/// Stream every tile of the dashboard (progressive loading)
pub async fn stream_dashboard(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let layout = {
        let mut controller = state.controller.lock().await;
        ensure_mounted(&mut controller).await;
        controller.layout().clone()
    };

    let rx = state
        .tile_service
        .stream_dashboard(layout, &host_of(&headers))
        .await;
    stream_from_receiver(rx)
}
