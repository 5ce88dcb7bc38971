// Tile render models
use serde::Serialize;
use serde_json::Value;

pub const UNKNOWN_WIDGET_NAME: &str = "Unknown Widget";
pub const EMPTY_LAYOUT_MESSAGE: &str = "No widgets configured. Click Edit to add some!";

/// Lifecycle of a single tile's data fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TileState {
    Loading,
    Ready { body: Value },
    Error { message: String },
    /// The tile's type is not in the registry.
    Unknown,
}

impl TileState {
    pub fn is_error(&self) -> bool {
        matches!(self, TileState::Error { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GridMode {
    Viewing,
    Editing,
}

/// Registry entry as offered in the "add widget" picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WidgetSummary {
    #[serde(rename = "type")]
    pub widget_type: String,
    pub name: String,
    pub description: String,
    pub default_width: u32,
    pub default_height: u32,
}

/// One tile as handed to the grid engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TileView {
    pub id: String,
    #[serde(rename = "type")]
    pub widget_type: String,
    pub name: String,
    pub known: bool,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    /// Static tiles pass pointer input through to the widget body.
    #[serde(rename = "static")]
    pub is_static: bool,
    pub is_draggable: bool,
    pub is_resizable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardView {
    pub mode: GridMode,
    pub revision: u64,
    pub tiles: Vec<TileView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<&'static str>,
    pub add_picker_open: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub available: Vec<WidgetSummary>,
}

/// Result of loading one tile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileData {
    pub id: String,
    #[serde(rename = "type")]
    pub widget_type: String,
    pub state: TileState,
}

/// Messages on the progressive dashboard stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StreamMessage {
    Skeleton { tiles: Vec<TileData> },
    TileUpdate { tile: TileData },
    Complete { total_tiles: usize, failed: usize, duration_ms: u64 },
}
