// Dashboard grid controller - Layout editing state machine
use crate::application::layout_repository::LayoutRepository;
use crate::application::widget_registry::WidgetRegistry;
use crate::domain::tile::{
    DashboardView, GridMode, TileView, EMPTY_LAYOUT_MESSAGE, UNKNOWN_WIDGET_NAME,
};
use crate::domain::widget::{next_slot, Layout, LayoutUpdate, WidgetInstance};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error("dashboard has not been mounted")]
    NotReady,
    #[error("layout changes require edit mode")]
    NotEditing,
    #[error("unknown widget type '{0}'")]
    UnknownWidgetType(String),
    #[error("failed to save layout: {0:#}")]
    Persist(anyhow::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Loading,
    Ready(GridMode),
}

/// Owns the in-memory layout for the editing session. Every completed edit is
/// written through the store exactly once.
pub struct GridController {
    registry: Arc<WidgetRegistry>,
    store: Arc<dyn LayoutRepository>,
    state: ControllerState,
    layout: Layout,
    add_picker_open: bool,
    revision: u64,
}

impl GridController {
    pub fn new(registry: Arc<WidgetRegistry>, store: Arc<dyn LayoutRepository>) -> Self {
        Self {
            registry,
            store,
            state: ControllerState::Loading,
            layout: Vec::new(),
            add_picker_open: false,
            revision: 0,
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Load the persisted layout and start viewing. Missing or unreadable
    /// layouts start the dashboard empty.
    pub async fn mount(&mut self) {
        self.layout = match self.store.load().await {
            Ok(Some(layout)) => layout,
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to load layout, starting empty: {:#}", e);
                Vec::new()
            }
        };
        self.state = ControllerState::Ready(GridMode::Viewing);
        self.add_picker_open = false;

        let unknown = self
            .layout
            .iter()
            .filter(|w| !self.registry.contains(&w.widget_type))
            .count();
        tracing::info!(
            "Mounted dashboard with {} widgets ({} unknown)",
            self.layout.len(),
            unknown
        );
    }

    pub fn enter_edit(&mut self) -> Result<(), ControllerError> {
        self.require_ready()?;
        self.state = ControllerState::Ready(GridMode::Editing);
        Ok(())
    }

    pub fn exit_edit(&mut self) -> Result<(), ControllerError> {
        self.require_ready()?;
        self.state = ControllerState::Ready(GridMode::Viewing);
        self.add_picker_open = false;
        Ok(())
    }

    pub fn open_add_picker(&mut self) -> Result<(), ControllerError> {
        self.require_editing()?;
        self.add_picker_open = true;
        Ok(())
    }

    pub fn close_add_picker(&mut self) {
        self.add_picker_open = false;
    }

    /// Apply the geometry of a completed drag or resize. Updates for ids not in
    /// the layout are ignored; tiles missing from the update keep their place.
    pub async fn on_arrange(&mut self, updates: &[LayoutUpdate]) -> Result<(), ControllerError> {
        self.require_editing()?;

        for widget in &mut self.layout {
            if let Some(update) = updates.iter().find(|u| u.id == widget.id) {
                widget.apply(update);
            }
        }

        self.persist().await
    }

    pub async fn add_widget(&mut self, widget_type: &str) -> Result<WidgetInstance, ControllerError> {
        self.require_editing()?;
        let module = self
            .registry
            .lookup(widget_type)
            .ok_or_else(|| ControllerError::UnknownWidgetType(widget_type.to_string()))?;

        let (x, y) = next_slot(&self.layout);
        let widget = WidgetInstance::new(
            self.generate_id(widget_type),
            widget_type.to_string(),
            x,
            y,
            module.default_width,
            module.default_height,
        );
        tracing::info!("Adding {} at ({}, {})", widget.id, x, y);

        self.layout.push(widget.clone());
        self.add_picker_open = false;
        self.persist().await?;
        Ok(widget)
    }

    /// Remove a tile. Returns whether anything was removed; the layout is
    /// saved either way.
    pub async fn remove_widget(&mut self, id: &str) -> Result<bool, ControllerError> {
        self.require_editing()?;

        let before = self.layout.len();
        self.layout.retain(|w| w.id != id);
        let removed = self.layout.len() != before;
        if !removed {
            tracing::debug!("Remove of unknown widget {} ignored", id);
        }

        self.persist().await?;
        Ok(removed)
    }

    /// Adopt a whole layout supplied by the client.
    pub async fn replace_layout(&mut self, layout: Layout) -> Result<(), ControllerError> {
        self.layout = layout;
        if self.state == ControllerState::Loading {
            self.state = ControllerState::Ready(GridMode::Viewing);
        }
        self.persist().await
    }

    pub fn view(&self) -> DashboardView {
        let mode = match self.state {
            ControllerState::Ready(mode) => mode,
            ControllerState::Loading => GridMode::Viewing,
        };
        let editing = mode == GridMode::Editing;

        let tiles = self
            .layout
            .iter()
            .map(|w| {
                let module = self.registry.lookup(&w.widget_type);
                TileView {
                    id: w.id.clone(),
                    widget_type: w.widget_type.clone(),
                    name: module
                        .map(|m| m.display_name.clone())
                        .unwrap_or_else(|| UNKNOWN_WIDGET_NAME.to_string()),
                    known: module.is_some(),
                    x: w.x,
                    y: w.y,
                    w: w.w,
                    h: w.h,
                    is_static: !editing,
                    is_draggable: editing,
                    is_resizable: editing,
                }
            })
            .collect::<Vec<_>>();

        DashboardView {
            mode,
            revision: self.revision,
            empty_message: tiles.is_empty().then_some(EMPTY_LAYOUT_MESSAGE),
            tiles,
            add_picker_open: self.add_picker_open,
            available: if self.add_picker_open {
                self.registry.summaries()
            } else {
                Vec::new()
            },
        }
    }

    // The in-memory layout is kept on failure so a retried edit saves it.
    async fn persist(&mut self) -> Result<(), ControllerError> {
        self.store.save(&self.layout).await.map_err(|e| {
            tracing::error!("Failed to save layout after revision {}: {:#}", self.revision, e);
            ControllerError::Persist(e)
        })?;
        self.revision += 1;
        Ok(())
    }

    fn generate_id(&self, widget_type: &str) -> String {
        let base = format!("{}-{}", widget_type, chrono::Utc::now().timestamp_millis());
        let taken = |id: &str| self.layout.iter().any(|w| w.id == id);
        if !taken(&base) {
            return base;
        }
        (2..)
            .map(|n| format!("{}-{}", base, n))
            .find(|id| !taken(id))
            .unwrap_or(base)
    }

    fn require_ready(&self) -> Result<(), ControllerError> {
        match self.state {
            ControllerState::Ready(_) => Ok(()),
            ControllerState::Loading => Err(ControllerError::NotReady),
        }
    }

    fn require_editing(&self) -> Result<(), ControllerError> {
        match self.state {
            ControllerState::Ready(GridMode::Editing) => Ok(()),
            ControllerState::Ready(GridMode::Viewing) => Err(ControllerError::NotEditing),
            ControllerState::Loading => Err(ControllerError::NotReady),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::application::widget_registry::tests::static_module;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// In-memory store that records every save.
    #[derive(Default)]
    pub(crate) struct MemoryStore {
        pub document: Mutex<Option<Layout>>,
        pub saves: Mutex<Vec<Layout>>,
        pub fail_saves: Mutex<bool>,
    }

    impl MemoryStore {
        pub fn with_layout(layout: Layout) -> Self {
            Self {
                document: Mutex::new(Some(layout)),
                ..Self::default()
            }
        }

        pub fn save_count(&self) -> usize {
            self.saves.lock().unwrap().len()
        }

        pub fn saved(&self) -> Option<Layout> {
            self.document.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LayoutRepository for MemoryStore {
        async fn load(&self) -> anyhow::Result<Option<Layout>> {
            Ok(self.document.lock().unwrap().clone())
        }

        async fn save(&self, layout: &Layout) -> anyhow::Result<()> {
            if *self.fail_saves.lock().unwrap() {
                anyhow::bail!("disk full");
            }
            *self.document.lock().unwrap() = Some(layout.clone());
            self.saves.lock().unwrap().push(layout.clone());
            Ok(())
        }
    }

    pub(crate) fn test_registry() -> Arc<WidgetRegistry> {
        let mut registry = WidgetRegistry::new();
        registry.register(static_module("weather-local", "Local Weather"));
        registry.register(static_module("chores-list", "Daily Chores"));
        registry.register(static_module("workout-status", "Training Status").with_default_size(2, 1));
        Arc::new(registry)
    }

    fn tile(id: &str, widget_type: &str, x: u32, y: u32) -> WidgetInstance {
        WidgetInstance::new(id.into(), widget_type.into(), x, y, 1, 1)
    }

    async fn editing_controller(store: Arc<MemoryStore>) -> GridController {
        let mut controller = GridController::new(test_registry(), store);
        controller.mount().await;
        controller.enter_edit().unwrap();
        controller
    }

    #[tokio::test]
    async fn test_mount_without_layout_starts_empty() {
        let store = Arc::new(MemoryStore::default());
        let mut controller = GridController::new(test_registry(), store.clone());
        assert_eq!(controller.state(), ControllerState::Loading);

        controller.mount().await;

        assert_eq!(controller.state(), ControllerState::Ready(GridMode::Viewing));
        let view = controller.view();
        assert!(view.tiles.is_empty());
        assert_eq!(view.empty_message, Some(EMPTY_LAYOUT_MESSAGE));
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn test_edit_toggle_has_no_side_effects() {
        let store = Arc::new(MemoryStore::with_layout(vec![tile("a", "weather-local", 0, 0)]));
        let mut controller = GridController::new(test_registry(), store.clone());

        assert!(matches!(controller.enter_edit(), Err(ControllerError::NotReady)));
        controller.mount().await;

        controller.enter_edit().unwrap();
        let view = controller.view();
        assert_eq!(view.mode, GridMode::Editing);
        assert!(!view.tiles[0].is_static);
        assert!(view.tiles[0].is_draggable);

        controller.exit_edit().unwrap();
        let view = controller.view();
        assert_eq!(view.mode, GridMode::Viewing);
        assert!(view.tiles[0].is_static);
        assert!(!view.tiles[0].is_resizable);
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn test_edits_rejected_while_viewing() {
        let store = Arc::new(MemoryStore::default());
        let mut controller = GridController::new(test_registry(), store.clone());
        controller.mount().await;

        assert!(matches!(
            controller.add_widget("weather-local").await,
            Err(ControllerError::NotEditing)
        ));
        assert!(matches!(
            controller.remove_widget("a").await,
            Err(ControllerError::NotEditing)
        ));
        assert!(matches!(controller.on_arrange(&[]).await, Err(ControllerError::NotEditing)));
        assert!(matches!(controller.open_add_picker(), Err(ControllerError::NotEditing)));
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn test_add_to_empty_layout() {
        let store = Arc::new(MemoryStore::default());
        let mut controller = editing_controller(store.clone()).await;
        controller.open_add_picker().unwrap();
        assert_eq!(controller.view().available.len(), 3);

        let widget = controller.add_widget("workout-status").await.unwrap();

        assert_eq!((widget.x, widget.y), (0, 0));
        assert_eq!((widget.w, widget.h), (2, 1));
        assert!(widget.id.starts_with("workout-status-"));
        assert!(!controller.view().add_picker_open);
        assert_eq!(store.save_count(), 1);
        assert_eq!(store.saved(), Some(vec![widget]));
    }

    #[tokio::test]
    async fn test_add_fills_bottom_row() {
        let store = Arc::new(MemoryStore::default());
        let mut controller = editing_controller(store.clone()).await;

        let first = controller.add_widget("weather-local").await.unwrap();
        let second = controller.add_widget("weather-local").await.unwrap();
        let third = controller.add_widget("chores-list").await.unwrap();

        assert_eq!((first.x, first.y), (0, 0));
        assert_eq!((second.x, second.y), (1, 0));
        assert_eq!((third.x, third.y), (2, 0));
        assert_ne!(first.id, second.id);
        assert_eq!(store.save_count(), 3);
    }

    #[tokio::test]
    async fn test_add_unknown_type() {
        let store = Arc::new(MemoryStore::default());
        let mut controller = editing_controller(store.clone()).await;

        let result = controller.add_widget("lava-lamp").await;

        assert!(matches!(result, Err(ControllerError::UnknownWidgetType(t)) if t == "lava-lamp"));
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn test_arrange_updates_matching_ids_only() {
        let store = Arc::new(MemoryStore::with_layout(vec![
            tile("a", "weather-local", 0, 0),
            tile("b", "chores-list", 1, 0),
        ]));
        let mut controller = editing_controller(store.clone()).await;
        let updates = vec![
            LayoutUpdate { id: "b".into(), x: 0, y: 1, w: 2, h: 2 },
            LayoutUpdate { id: "ghost".into(), x: 5, y: 5, w: 1, h: 1 },
        ];

        controller.on_arrange(&updates).await.unwrap();
        let once = controller.layout().clone();
        controller.on_arrange(&updates).await.unwrap();

        assert_eq!(controller.layout(), &once);
        assert_eq!(once[0], tile("a", "weather-local", 0, 0));
        assert_eq!(once[1], WidgetInstance::new("b".into(), "chores-list".into(), 0, 1, 2, 2));
        assert_eq!(once.len(), 2);
        assert_eq!(store.save_count(), 2);
    }

    #[tokio::test]
    async fn test_remove_missing_id_saves_identical_document() {
        let original = vec![tile("a", "weather-local", 0, 0), tile("b", "chores-list", 1, 0)];
        let store = Arc::new(MemoryStore::with_layout(original.clone()));
        let mut controller = editing_controller(store.clone()).await;

        let removed = controller.remove_widget("nope").await.unwrap();

        assert!(!removed);
        assert_eq!(store.saved(), Some(original));
    }

    #[tokio::test]
    async fn test_remove_widget() {
        let store = Arc::new(MemoryStore::with_layout(vec![
            tile("a", "weather-local", 0, 0),
            tile("b", "chores-list", 1, 0),
        ]));
        let mut controller = editing_controller(store.clone()).await;

        assert!(controller.remove_widget("a").await.unwrap());

        assert_eq!(store.saved(), Some(vec![tile("b", "chores-list", 1, 0)]));
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn test_save_failure_keeps_memory_state() {
        let store = Arc::new(MemoryStore::default());
        let mut controller = editing_controller(store.clone()).await;
        *store.fail_saves.lock().unwrap() = true;
        let revision = controller.revision();

        let result = controller.add_widget("weather-local").await;

        assert!(matches!(result, Err(ControllerError::Persist(_))));
        assert_eq!(controller.layout().len(), 1);
        assert_eq!(controller.revision(), revision);
        assert_eq!(controller.view().revision, revision);

        // Retrying any edit persists the kept state
        *store.fail_saves.lock().unwrap() = false;
        controller.on_arrange(&[]).await.unwrap();
        assert_eq!(store.saved().unwrap().len(), 1);
        assert_eq!(controller.revision(), revision + 1);
    }

    #[tokio::test]
    async fn test_unknown_type_renders_placeholder() {
        let store = Arc::new(MemoryStore::with_layout(vec![
            tile("a", "weather-local", 0, 0),
            tile("z", "retired-widget", 1, 0),
        ]));
        let mut controller = GridController::new(test_registry(), store);
        controller.mount().await;

        let view = controller.view();

        assert_eq!(view.tiles[0].name, "Local Weather");
        assert!(view.tiles[0].known);
        assert_eq!(view.tiles[1].name, UNKNOWN_WIDGET_NAME);
        assert!(!view.tiles[1].known);
        assert_eq!(view.empty_message, None);
    }

    #[tokio::test]
    async fn test_replace_layout_before_mount() {
        let store = Arc::new(MemoryStore::default());
        let mut controller = GridController::new(test_registry(), store.clone());
        let layout = vec![tile("a", "weather-local", 0, 0)];

        controller.replace_layout(layout.clone()).await.unwrap();

        assert_eq!(controller.state(), ControllerState::Ready(GridMode::Viewing));
        assert_eq!(store.saved(), Some(layout));
        assert_eq!(controller.revision(), 1);
    }

    #[tokio::test]
    async fn test_generated_ids_do_not_collide() {
        let store = Arc::new(MemoryStore::default());
        let mut controller = editing_controller(store).await;

        let mut ids = Vec::new();
        for _ in 0..5 {
            ids.push(controller.add_widget("chores-list").await.unwrap().id);
        }
        ids.sort();
        ids.dedup();

        assert_eq!(ids.len(), 5);
    }
}
