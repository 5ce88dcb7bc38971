// Application state for HTTP handlers
use crate::application::grid_controller::GridController;
use crate::application::layout_repository::LayoutRepository;
use crate::application::tile_service::TileService;
use crate::application::widget_registry::WidgetRegistry;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<WidgetRegistry>,
    pub store: Arc<dyn LayoutRepository>,
    // Held across saves, so layout writes land in edit order
    pub controller: Arc<Mutex<GridController>>,
    pub tile_service: TileService,
}

impl AppState {
    pub fn new(
        registry: Arc<WidgetRegistry>,
        store: Arc<dyn LayoutRepository>,
        tile_service: TileService,
    ) -> Self {
        let controller = GridController::new(registry.clone(), store.clone());
        Self {
            registry,
            store,
            controller: Arc::new(Mutex::new(controller)),
            tile_service,
        }
    }
}
