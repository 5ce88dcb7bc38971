use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub layout: LayoutSettings,
    #[serde(default)]
    pub fetch: FetchSettings,
    #[serde(default)]
    pub backends: BackendSettings,
    #[serde(default)]
    pub weather: WeatherSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LayoutSettings {
    #[serde(default = "default_layout_path")]
    pub path: PathBuf,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            path: default_layout_path(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct FetchSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl FetchSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Backend base URLs. Values may contain `${host}`, which is replaced by the
/// host the dashboard was reached on, so sibling services on that machine
/// resolve from any device on the network.
#[derive(Debug, Deserialize, Clone)]
pub struct BackendSettings {
    #[serde(default = "default_workout_url")]
    pub workout_url: String,
    #[serde(default = "default_workout_user_id")]
    pub workout_user_id: String,
    #[serde(default = "default_chores_url")]
    pub chores_url: String,
    #[serde(default = "default_calendar_url")]
    pub calendar_url: String,
    #[serde(default = "default_octopi_url")]
    pub octopi_url: String,
    #[serde(default)]
    pub octopi_api_key: Option<String>,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            workout_url: default_workout_url(),
            workout_user_id: default_workout_user_id(),
            chores_url: default_chores_url(),
            calendar_url: default_calendar_url(),
            octopi_url: default_octopi_url(),
            octopi_api_key: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherSettings {
    #[serde(default = "default_weather_url")]
    pub url: String,
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    #[serde(default = "default_longitude")]
    pub longitude: f64,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            url: default_weather_url(),
            latitude: default_latitude(),
            longitude: default_longitude(),
        }
    }
}

/// Backend URLs with `${host}` already substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub workout_url: String,
    pub workout_user_id: String,
    pub chores_url: String,
    pub calendar_url: String,
    pub octopi_url: String,
    pub octopi_api_key: Option<String>,
}

impl BackendSettings {
    pub fn resolve(&self, host: &str) -> Endpoints {
        let mut vars = HashMap::new();
        vars.insert("host".to_string(), host.to_string());
        let url = |template: &str| {
            prepare_template(template, &vars)
                .trim_end_matches('/')
                .to_string()
        };

        Endpoints {
            workout_url: url(&self.workout_url),
            workout_user_id: self.workout_user_id.clone(),
            chores_url: url(&self.chores_url),
            calendar_url: url(&self.calendar_url),
            octopi_url: url(&self.octopi_url),
            octopi_api_key: self.octopi_api_key.clone().filter(|k| !k.is_empty()),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_layout_path() -> PathBuf {
    PathBuf::from("data/layout.json")
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_workout_url() -> String {
    "http://${host}:8000".to_string()
}

fn default_workout_user_id() -> String {
    "175196118".to_string()
}

fn default_chores_url() -> String {
    "http://${host}:5000".to_string()
}

fn default_calendar_url() -> String {
    "http://${host}:5005".to_string()
}

fn default_octopi_url() -> String {
    "http://octopi.local".to_string()
}

fn default_weather_url() -> String {
    "https://api.open-meteo.com/v1/forecast".to_string()
}

fn default_latitude() -> f64 {
    40.7128
}

fn default_longitude() -> f64 {
    -74.0060
}

/// Layered settings: optional `config/dashboard.*` file, then `MNEMOSYNE__*`
/// environment variables (e.g. `MNEMOSYNE__BACKENDS__CHORES_URL`).
pub fn load_settings() -> anyhow::Result<Settings> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(
            config::Environment::with_prefix("MNEMOSYNE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Host name from a `Host` header value, without the port.
pub fn request_host(header: Option<&str>) -> String {
    let Some(raw) = header.map(str::trim).filter(|h| !h.is_empty()) else {
        return "localhost".to_string();
    };

    // Bracketed IPv6 literal, e.g. "[::1]:3000"
    if raw.starts_with('[') {
        if let Some(end) = raw.find(']') {
            return raw[..=end].to_string();
        }
    }

    match raw.rsplit_once(':') {
        Some((host, port)) if port.chars().all(|c| c.is_ascii_digit()) => host.to_string(),
        _ => raw.to_string(),
    }
}

/// Replace template variables in a string
pub fn prepare_template(template: &str, vars: &HashMap<String, String>) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, value);
    }
    result
}
