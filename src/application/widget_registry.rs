// Widget registry - Maps widget type ids to their modules
use crate::domain::tile::WidgetSummary;
use crate::infrastructure::config::{Endpoints, WeatherSettings};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Everything a widget needs to load its data for one request.
#[derive(Debug, Clone)]
pub struct FetchContext {
    pub client: reqwest::Client,
    pub endpoints: Endpoints,
    pub weather: WeatherSettings,
}

/// Data side of a widget: produces the tile body.
#[async_trait]
pub trait WidgetSource: Send + Sync {
    async fn load(&self, ctx: &FetchContext) -> anyhow::Result<Value>;
}

#[derive(Clone)]
pub struct WidgetModule {
    pub widget_type: String,
    pub display_name: String,
    pub description: String,
    pub default_width: u32,
    pub default_height: u32,
    pub source: Arc<dyn WidgetSource>,
}

impl WidgetModule {
    pub fn new(
        widget_type: &str,
        display_name: &str,
        description: &str,
        source: Arc<dyn WidgetSource>,
    ) -> Self {
        Self {
            widget_type: widget_type.to_string(),
            display_name: display_name.to_string(),
            description: description.to_string(),
            default_width: 1,
            default_height: 1,
            source,
        }
    }

    pub fn with_default_size(mut self, width: u32, height: u32) -> Self {
        self.default_width = width.max(1);
        self.default_height = height.max(1);
        self
    }

    pub fn summary(&self) -> WidgetSummary {
        WidgetSummary {
            widget_type: self.widget_type.clone(),
            name: self.display_name.clone(),
            description: self.description.clone(),
            default_width: self.default_width,
            default_height: self.default_height,
        }
    }
}

impl std::fmt::Debug for WidgetModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetModule")
            .field("widget_type", &self.widget_type)
            .field("display_name", &self.display_name)
            .field("default_width", &self.default_width)
            .field("default_height", &self.default_height)
            .finish_non_exhaustive()
    }
}

/// Registered widget modules, in registration order.
///
/// Populated once at startup and shared read-only afterwards.
#[derive(Clone, Default)]
pub struct WidgetRegistry {
    modules: Vec<WidgetModule>,
    index: HashMap<String, usize>,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module. A duplicate type replaces the earlier entry in place.
    pub fn register(&mut self, module: WidgetModule) {
        match self.index.get(&module.widget_type) {
            Some(&pos) => {
                tracing::warn!(
                    widget = %module.widget_type,
                    "Widget type already registered, replacing"
                );
                self.modules[pos] = module;
            }
            None => {
                self.index
                    .insert(module.widget_type.clone(), self.modules.len());
                self.modules.push(module);
            }
        }
    }

    pub fn lookup(&self, widget_type: &str) -> Option<&WidgetModule> {
        self.index.get(widget_type).map(|&pos| &self.modules[pos])
    }

    pub fn contains(&self, widget_type: &str) -> bool {
        self.index.contains_key(widget_type)
    }

    pub fn list_all(&self) -> impl Iterator<Item = &WidgetModule> + '_ {
        self.modules.iter()
    }

    pub fn summaries(&self) -> Vec<WidgetSummary> {
        self.list_all().map(WidgetModule::summary).collect()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    pub(crate) struct StaticSource(pub Value);

    #[async_trait]
    impl WidgetSource for StaticSource {
        async fn load(&self, _ctx: &FetchContext) -> anyhow::Result<Value> {
            Ok(self.0.clone())
        }
    }

    pub(crate) fn static_module(widget_type: &str, name: &str) -> WidgetModule {
        WidgetModule::new(
            widget_type,
            name,
            "test widget",
            Arc::new(StaticSource(json!({ "name": name }))),
        )
    }

    pub(crate) fn test_context() -> FetchContext {
        FetchContext {
            client: reqwest::Client::new(),
            endpoints: crate::infrastructure::config::BackendSettings::default()
                .resolve("localhost"),
            weather: WeatherSettings::default(),
        }
    }

    #[test]
    fn test_lookup_absent() {
        let registry = WidgetRegistry::new();
        assert!(registry.lookup("weather-local").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_list_all_in_registration_order() {
        let mut registry = WidgetRegistry::new();
        registry.register(static_module("b", "B"));
        registry.register(static_module("a", "A"));
        registry.register(static_module("c", "C"));

        let types: Vec<_> = registry.list_all().map(|m| m.widget_type.as_str()).collect();
        assert_eq!(types, vec!["b", "a", "c"]);

        // Restartable
        assert_eq!(registry.list_all().count(), 3);
    }

    #[tokio::test]
    async fn test_reregistration_last_wins() {
        let mut registry = WidgetRegistry::new();
        registry.register(static_module("x", "First"));
        registry.register(static_module("y", "Other"));
        registry.register(static_module("x", "Second").with_default_size(2, 3));

        let module = registry.lookup("x").unwrap();
        assert_eq!(module.display_name, "Second");
        assert_eq!((module.default_width, module.default_height), (2, 3));
        assert_eq!(registry.len(), 2);

        let body = module.source.load(&test_context()).await.unwrap();
        assert_eq!(body, json!({ "name": "Second" }));

        let types: Vec<_> = registry.list_all().map(|m| m.widget_type.as_str()).collect();
        assert_eq!(types, vec!["x", "y"]);
    }

    #[test]
    fn test_default_size_floor() {
        let module = static_module("x", "X").with_default_size(0, 0);
        assert_eq!((module.default_width, module.default_height), (1, 1));
    }
}
