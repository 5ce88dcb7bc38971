// Local weather from the Open-Meteo forecast API
use super::fetch_json;
use crate::application::widget_registry::{FetchContext, WidgetModule, WidgetSource};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,weather_code";
const DAILY_FIELDS: &str = "temperature_2m_max,temperature_2m_min";

pub fn module() -> WidgetModule {
    WidgetModule::new(
        "weather-local",
        "Local Weather",
        "Tracks incoming weather, temperature, and humidity for the configured location.",
        Arc::new(WeatherSource),
    )
}

pub struct WeatherSource;

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    current: Option<CurrentConditions>,
    #[serde(default)]
    daily: Option<DailyForecast>,
}

#[derive(Debug, Deserialize)]
struct CurrentConditions {
    temperature_2m: Option<f64>,
    relative_humidity_2m: Option<f64>,
    weather_code: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct DailyForecast {
    #[serde(default)]
    temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m_min: Vec<Option<f64>>,
}

#[derive(Debug, Serialize, PartialEq)]
struct WeatherBody {
    temp: Option<i64>,
    condition: &'static str,
    high: Option<i64>,
    low: Option<i64>,
    humidity: Option<f64>,
}

impl WeatherSource {
    fn forecast_url(ctx: &FetchContext) -> String {
        format!(
            "{}?latitude={}&longitude={}&current={}&daily={}&temperature_unit=fahrenheit&wind_speed_unit=mph&precipitation_unit=inch&timezone=auto",
            ctx.weather.url,
            ctx.weather.latitude,
            ctx.weather.longitude,
            urlencoding::encode(CURRENT_FIELDS),
            urlencoding::encode(DAILY_FIELDS),
        )
    }
}

#[async_trait]
impl WidgetSource for WeatherSource {
    async fn load(&self, ctx: &FetchContext) -> anyhow::Result<Value> {
        let url = Self::forecast_url(ctx);
        let forecast: ForecastResponse = fetch_json(&ctx.client, &url, HeaderMap::new()).await?;
        Ok(serde_json::to_value(summarize(forecast))?)
    }
}

fn summarize(forecast: ForecastResponse) -> WeatherBody {
    let current = forecast.current;
    let first = |values: Option<&Vec<Option<f64>>>| {
        values
            .and_then(|v| v.first().copied().flatten())
            .map(|t| t.round() as i64)
    };

    WeatherBody {
        temp: current
            .as_ref()
            .and_then(|c| c.temperature_2m)
            .map(|t| t.round() as i64),
        condition: current
            .as_ref()
            .and_then(|c| c.weather_code)
            .map(describe_code)
            .unwrap_or("Unknown"),
        high: first(forecast.daily.as_ref().map(|d| &d.temperature_2m_max)),
        low: first(forecast.daily.as_ref().map(|d| &d.temperature_2m_min)),
        humidity: current.and_then(|c| c.relative_humidity_2m),
    }
}

/// WMO weather interpretation code to a short description.
pub fn describe_code(code: u16) -> &'static str {
    match code {
        0 => "Clear Sky",
        1 => "Mainly Clear",
        2 => "Partly Cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing Rime Fog",
        51 => "Light Drizzle",
        53 => "Moderate Drizzle",
        55 => "Dense Drizzle",
        56 => "Light Freezing Drizzle",
        57 => "Dense Freezing Drizzle",
        61 => "Slight Rain",
        63 => "Moderate Rain",
        65 => "Heavy Rain",
        66 => "Light Freezing Rain",
        67 => "Heavy Freezing Rain",
        71 => "Slight Snow Fall",
        73 => "Moderate Snow Fall",
        75 => "Heavy Snow Fall",
        77 => "Snow Grains",
        80 => "Slight Rain Showers",
        81 => "Moderate Rain Showers",
        82 => "Violent Rain Showers",
        85 => "Slight Snow Showers",
        86 => "Heavy Snow Showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm + Hail",
        99 => "Heavy Hail Thunderstorm",
        _ => "Unknown",
    }
}
