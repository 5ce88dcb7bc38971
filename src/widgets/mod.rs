// Widget modules - One data source per dashboard tile type
use crate::application::widget_registry::WidgetRegistry;
use anyhow::Context;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use serde_json::Value;

mod calendar;
mod chores;
mod equipment;
mod octopi;
mod weather;
mod workout;

/// Register every built-in widget. Called once at startup.
pub fn register_all(registry: &mut WidgetRegistry) {
    registry.register(workout::module());
    registry.register(calendar::module());
    registry.register(chores::module());
    registry.register(equipment::module());
    registry.register(weather::module());
    registry.register(octopi::module());
}

/// GET a JSON document, treating any non-success status as an error.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    headers: HeaderMap,
) -> anyhow::Result<T> {
    let response = client
        .get(url)
        .headers(headers)
        .header("Accept", "application/json")
        .send()
        .await
        .with_context(|| format!("Failed to send request to {}", url))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("Request to {} failed with status {}: {}", url, status, body);
    }

    response
        .json::<T>()
        .await
        .with_context(|| format!("Failed to parse response from {}", url))
}

pub(crate) fn f64_field(value: &Value, key: &str) -> Option<f64> {
    value.get(key).and_then(Value::as_f64)
}

pub(crate) fn str_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
