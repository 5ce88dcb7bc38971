// Presentation layer - HTTP routes
pub mod app_state;
pub mod errors;
pub mod handlers;

use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    add_widget, arrange, close_picker, enter_edit, exit_edit, get_dashboard, get_layout,
    get_tile, health_check, list_widgets, mount_dashboard, open_picker, remove_widget,
    save_layout, stream_dashboard,
};
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/api/layout", get(get_layout).post(save_layout))
        .route("/api/widgets", get(list_widgets))
        .route("/api/dashboard", get(get_dashboard))
        .route("/api/dashboard/mount", post(mount_dashboard))
        .route("/api/dashboard/edit", post(enter_edit).delete(exit_edit))
        .route("/api/dashboard/picker", post(open_picker).delete(close_picker))
        .route("/api/dashboard/arrange", post(arrange))
        .route("/api/dashboard/widgets", post(add_widget))
        .route("/api/dashboard/widgets/:id", delete(remove_widget))
        .route("/api/dashboard/stream", get(stream_dashboard))
        .route("/api/tiles/:id", get(get_tile))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
