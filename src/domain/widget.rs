// Widget placement domain models
use serde::{Deserialize, Serialize};

/// A placed tile on the dashboard grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetInstance {
    // The browser grid engine keys items by `i`
    #[serde(alias = "i")]
    pub id: String,
    #[serde(rename = "type")]
    pub widget_type: String,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl WidgetInstance {
    pub fn new(id: String, widget_type: String, x: u32, y: u32, w: u32, h: u32) -> Self {
        Self {
            id,
            widget_type,
            x,
            y,
            w,
            h,
        }
    }

    pub fn right_edge(&self) -> u32 {
        self.x.saturating_add(self.w)
    }

    pub fn apply(&mut self, update: &LayoutUpdate) {
        self.x = update.x;
        self.y = update.y;
        self.w = update.w;
        self.h = update.h;
    }
}

/// Ordered collection of placed tiles. Order carries no priority but survives
/// a save/load round-trip.
pub type Layout = Vec<WidgetInstance>;

/// New geometry for one tile after a completed drag or resize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutUpdate {
    #[serde(alias = "i")]
    pub id: String,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

/// Greedy placement for a new tile: the right edge of the bottom-most row.
pub fn next_slot(layout: &[WidgetInstance]) -> (u32, u32) {
    let bottom_y = layout.iter().map(|w| w.y).max().unwrap_or(0);
    let right_x = layout
        .iter()
        .filter(|w| w.y == bottom_y)
        .map(WidgetInstance::right_edge)
        .max()
        .unwrap_or(0);
    (right_x, bottom_y)
}
