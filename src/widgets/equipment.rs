// Appliance maintenance schedule
use crate::application::widget_registry::{FetchContext, WidgetModule, WidgetSource};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

pub fn module() -> WidgetModule {
    WidgetModule::new(
        "equipment-manager",
        "Equipment Manager",
        "Tracks appliance filters and maintenance schedules.",
        Arc::new(EquipmentSource),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceStatus {
    Overdue,
    DueSoon,
    Ok,
}

impl MaintenanceStatus {
    /// Days until due; negative when already late.
    pub fn for_days(days: i32) -> Self {
        match days {
            d if d < 0 => MaintenanceStatus::Overdue,
            0..=7 => MaintenanceStatus::DueSoon,
            _ => MaintenanceStatus::Ok,
        }
    }
}

#[derive(Debug, Serialize)]
struct MaintenanceTask {
    item: &'static str,
    status: MaintenanceStatus,
    due: String,
}

// No backend yet; the schedule is fixed.
const SCHEDULE: &[(&str, i32)] = &[("HVAC Filter", -2), ("Water Filter", 3), ("Smoke Alarm", 25)];

pub struct EquipmentSource;

#[async_trait]
impl WidgetSource for EquipmentSource {
    async fn load(&self, _ctx: &FetchContext) -> anyhow::Result<Value> {
        let tasks: Vec<MaintenanceTask> = SCHEDULE
            .iter()
            .map(|&(item, days)| MaintenanceTask {
                item,
                status: MaintenanceStatus::for_days(days),
                due: format!("{} days", days),
            })
            .collect();
        Ok(json!({ "tasks": tasks }))
    }
}
