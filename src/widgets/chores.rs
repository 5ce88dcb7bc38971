// Top chores from the chore-chart service
use super::{f64_field, fetch_json, str_field};
use crate::application::widget_registry::{FetchContext, WidgetModule, WidgetSource};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

const MAX_CHORES: usize = 5;

pub fn module() -> WidgetModule {
    WidgetModule::new(
        "chores-list",
        "Daily Chores",
        "Displays the highest value chores remaining on your chore chart.",
        Arc::new(ChoresSource),
    )
}

pub struct ChoresSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PointTier {
    High,
    Medium,
    Low,
}

impl PointTier {
    pub fn for_points(points: f64) -> Self {
        if points >= 100.0 {
            PointTier::High
        } else if points >= 50.0 {
            PointTier::Medium
        } else {
            PointTier::Low
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
struct ChoreItem {
    title: String,
    description: String,
    points: f64,
    tier: PointTier,
}

#[async_trait]
impl WidgetSource for ChoresSource {
    async fn load(&self, ctx: &FetchContext) -> anyhow::Result<Value> {
        let url = format!("{}/api/chores", ctx.endpoints.chores_url);
        let chores: Vec<Value> = fetch_json(&ctx.client, &url, HeaderMap::new()).await?;

        let items: Vec<ChoreItem> = chores.iter().take(MAX_CHORES).map(to_item).collect();
        Ok(json!({ "chores": items }))
    }
}

fn to_item(chore: &Value) -> ChoreItem {
    let points = f64_field(chore, "points").unwrap_or(0.0);
    ChoreItem {
        title: str_field(chore, "title").unwrap_or_else(|| "Untitled".to_string()),
        description: str_field(chore, "description").unwrap_or_default(),
        points,
        tier: PointTier::for_points(points),
    }
}
