// 3D printer job status from an OctoPrint instance
use super::{f64_field, fetch_json, str_field};
use crate::application::widget_registry::{FetchContext, WidgetModule, WidgetSource};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

pub fn module() -> WidgetModule {
    WidgetModule::new(
        "octopi-status",
        "3D Printer Status",
        "Monitors the connected OctoPi instance for print progress and state.",
        Arc::new(OctopiSource),
    )
}

pub struct OctopiSource;

#[derive(Debug, Serialize, PartialEq)]
struct PrinterBody {
    state: String,
    printing: bool,
    file: Option<String>,
    progress: Option<u32>,
    time_left: Option<String>,
}

#[async_trait]
impl WidgetSource for OctopiSource {
    async fn load(&self, ctx: &FetchContext) -> anyhow::Result<Value> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &ctx.endpoints.octopi_api_key {
            headers.insert(
                "X-Api-Key",
                HeaderValue::from_str(key).context("OctoPrint API key is not a valid header")?,
            );
        }

        let url = format!("{}/api/job", ctx.endpoints.octopi_url);
        let job: Value = fetch_json(&ctx.client, &url, headers).await?;
        Ok(serde_json::to_value(summarize(&job))?)
    }
}

fn summarize(job: &Value) -> PrinterBody {
    let state = str_field(job, "state").unwrap_or_else(|| "Unknown".to_string());
    let progress = job.get("progress");

    PrinterBody {
        printing: state.starts_with("Printing"),
        file: job
            .get("job")
            .and_then(|j| j.get("file"))
            .and_then(|f| str_field(f, "name")),
        progress: progress
            .and_then(|p| f64_field(p, "completion"))
            .map(|c| c.clamp(0.0, 100.0).round() as u32),
        time_left: progress
            .and_then(|p| f64_field(p, "printTimeLeft"))
            .map(|secs| format_time_left(secs.max(0.0) as u64)),
        state,
    }
}

/// "1h 5m" style remaining time.
pub fn format_time_left(secs: u64) -> String {
    let minutes = (secs + 59) / 60;
    match (minutes / 60, minutes % 60) {
        (0, m) => format!("{}m", m),
        (h, 0) => format!("{}h", h),
        (h, m) => format!("{}h {}m", h, m),
    }
}
