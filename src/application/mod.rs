// Application layer - Use cases over the registry and layout store
pub mod grid_controller;
pub mod layout_repository;
pub mod tile_service;
pub mod widget_registry;
