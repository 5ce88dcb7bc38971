// Daily agenda from the calendar-schedule service
use super::{fetch_json, str_field};
use crate::application::widget_registry::{FetchContext, WidgetModule, WidgetSource};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

const NOT_AUTHENTICATED: &str = "NOT_AUTHENTICATED";

pub fn module() -> WidgetModule {
    WidgetModule::new(
        "calendar-google",
        "Google Calendar",
        "Displays your daily agenda synced with your Google Account.",
        Arc::new(CalendarSource),
    )
}

pub struct CalendarSource;

#[derive(Debug, Serialize, PartialEq)]
struct AgendaEntry {
    summary: String,
    start: Option<String>,
    all_day: bool,
    time: String,
    past: bool,
}

#[async_trait]
impl WidgetSource for CalendarSource {
    async fn load(&self, ctx: &FetchContext) -> anyhow::Result<Value> {
        let base = &ctx.endpoints.calendar_url;
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

        let schedule: Value =
            fetch_json(&ctx.client, &format!("{}/api/schedule/daily", base), headers).await?;

        if schedule.get("message").and_then(Value::as_str) == Some(NOT_AUTHENTICATED) {
            // The link button still works without the URL; the client can retry
            let auth_url = match fetch_json::<Value>(
                &ctx.client,
                &format!("{}/api/schedule/auth-url", base),
                HeaderMap::new(),
            )
            .await
            {
                Ok(body) => str_field(&body, "url"),
                Err(e) => {
                    tracing::debug!("Calendar auth URL unavailable: {:#}", e);
                    None
                }
            };
            return Ok(json!({ "linked": false, "auth_url": auth_url }));
        }

        let now = Utc::now();
        let events: Vec<AgendaEntry> = schedule
            .get("events")
            .and_then(Value::as_array)
            .map(|events| events.iter().map(|e| to_entry(e, now)).collect())
            .unwrap_or_default();

        Ok(json!({ "linked": true, "events": events }))
    }
}

fn to_entry(event: &Value, now: DateTime<Utc>) -> AgendaEntry {
    let start = event.get("start");
    let date_time = start.and_then(|s| str_field(s, "dateTime"));
    let date = start.and_then(|s| str_field(s, "date"));
    let summary = str_field(event, "summary").unwrap_or_else(|| "Busy".to_string());

    match (date_time, date) {
        (Some(dt), _) => {
            let parsed = DateTime::parse_from_rfc3339(&dt).ok();
            AgendaEntry {
                summary,
                time: parsed
                    .map(|t| t.format("%-I:%M %p").to_string())
                    .unwrap_or_default(),
                past: parsed.is_some_and(|t| t.with_timezone(&Utc) < now),
                start: Some(dt),
                all_day: false,
            }
        }
        (None, date) => {
            let day = date
                .as_deref()
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());
            AgendaEntry {
                summary,
                time: "All Day".to_string(),
                past: day.is_some_and(|d| d < now.date_naive()),
                start: date,
                all_day: true,
            }
        }
    }
}
