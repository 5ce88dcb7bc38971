// Domain layer - Layout and tile models
pub mod tile;
pub mod widget;
