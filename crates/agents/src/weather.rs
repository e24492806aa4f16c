//! Weather agent: conditions at the launch site plus a launch-suitability call.
//!
//! The location comes from the `launchpad` entry written by the SpaceX agent,
//! falling back to a configured default site. Without an OpenWeatherMap key
//! the agent serves deterministic mock conditions so runs work offline.

use async_trait::async_trait;
use goalchain_core::{Agent, AgentError, AgentId, Context, ContextDelta};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::http::HttpClient;
use crate::keys;

const MAX_SAFE_WIND_MS: f64 = 15.0;
const MIN_SAFE_VISIBILITY_M: u32 = 5_000;

pub struct WeatherAgent {
    http: HttpClient,
    base_url: String,
    api_key: Option<String>,
    fallback_location: Option<String>,
}

impl WeatherAgent {
    pub fn new(
        http: HttpClient,
        base_url: impl Into<String>,
        api_key: Option<String>,
        fallback_location: Option<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            fallback_location: fallback_location.filter(|l| !l.trim().is_empty()),
        }
    }

    /// Where to look up the weather: the launchpad locality, else the fallback.
    fn resolve_location(&self, context: &Context) -> Option<String> {
        context
            .get(keys::LAUNCHPAD)
            .and_then(|pad| pad.get("locality"))
            .and_then(|v| v.as_str())
            .filter(|l| !l.is_empty() && *l != "Unknown")
            .map(str::to_string)
            .or_else(|| self.fallback_location.clone())
    }

    async fn fetch(&self, location: &str, api_key: &str) -> Result<WeatherReport, AgentError> {
        let raw: OpenWeatherResponse = self
            .http
            .get_json(
                &format!("{}/weather", self.base_url),
                &[("q", location), ("appid", api_key), ("units", "metric")],
            )
            .await?;

        let first = raw.weather.into_iter().next().unwrap_or_default();
        Ok(WeatherReport {
            location: raw.name.unwrap_or_else(|| location.to_string()),
            conditions: first.main,
            description: first.description,
            temperature_c: raw.main.temp,
            humidity: raw.main.humidity,
            wind_speed: raw.wind.map(|w| w.speed).unwrap_or(0.0),
            visibility: raw.visibility.unwrap_or(10_000),
            source: "openweathermap".to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct OpenWeatherResponse {
    #[serde(default)]
    weather: Vec<OpenWeatherCondition>,
    main: OpenWeatherMain,
    wind: Option<OpenWeatherWind>,
    visibility: Option<u32>,
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OpenWeatherCondition {
    #[serde(default)]
    main: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherMain {
    temp: f64,
    #[serde(default)]
    humidity: u32,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherWind {
    speed: f64,
}

/// The `weather` context entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub location: String,
    /// Condition group, e.g. "Clear", "Rain", "Thunderstorm".
    pub conditions: String,
    pub description: String,
    pub temperature_c: f64,
    pub humidity: u32,
    /// Metres per second.
    pub wind_speed: f64,
    /// Metres.
    pub visibility: u32,
    pub source: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    Favorable,
    Caution,
    Unfavorable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// The `launch_suitability` context entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchSuitability {
    pub recommendation: Recommendation,
    pub risk_level: RiskLevel,
    pub issues: Vec<String>,
    pub analysis: String,
}

/// Judge whether the reported conditions allow a launch.
///
/// Each of precipitation/storms, strong wind and poor visibility counts as
/// one issue: none is favorable, one calls for caution, more is unfavorable.
pub fn assess_launch_conditions(report: &WeatherReport) -> LaunchSuitability {
    let conditions = report.conditions.to_lowercase();
    let mut issues = Vec::new();

    if ["rain", "storm", "drizzle", "snow"]
        .iter()
        .any(|w| conditions.contains(w))
    {
        issues.push("Precipitation detected".to_string());
    }
    if report.wind_speed > MAX_SAFE_WIND_MS {
        issues.push(format!("High wind speeds: {} m/s", report.wind_speed));
    }
    if report.visibility < MIN_SAFE_VISIBILITY_M {
        issues.push(format!("Poor visibility: {}m", report.visibility));
    }

    let (recommendation, risk_level, word) = match issues.len() {
        0 => (Recommendation::Favorable, RiskLevel::Low, "favorable"),
        1 => (Recommendation::Caution, RiskLevel::Medium, "caution"),
        _ => (Recommendation::Unfavorable, RiskLevel::High, "unfavorable"),
    };

    LaunchSuitability {
        recommendation,
        risk_level,
        issues,
        analysis: format!("Weather conditions are {word} for launch"),
    }
}

/// Deterministic mock conditions keyed on the location name.
fn mock_weather(location: &str) -> WeatherReport {
    let hash: u32 = location
        .bytes()
        .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));

    let conditions_list = [
        ("Clear", "clear sky"),
        ("Clouds", "scattered clouds"),
        ("Clouds", "overcast clouds"),
        ("Rain", "light rain"),
        ("Thunderstorm", "thunderstorm"),
        ("Mist", "mist"),
    ];
    let (conditions, description) = conditions_list[(hash as usize / 7) % conditions_list.len()];

    WeatherReport {
        location: location.to_string(),
        conditions: conditions.to_string(),
        description: description.to_string(),
        temperature_c: 15.0 + (hash % 150) as f64 / 10.0,
        humidity: 30 + (hash % 60),
        wind_speed: (hash % 20) as f64 + 1.5,
        visibility: if conditions == "Mist" { 3_000 } else { 10_000 },
        source: "mock".to_string(),
    }
}

#[async_trait]
impl Agent for WeatherAgent {
    fn id(&self) -> AgentId {
        AgentId::Weather
    }

    fn description(&self) -> &str {
        "Looks up weather at the launch site and rates launch suitability."
    }

    fn dependencies(&self) -> &[&'static str] {
        &[keys::LAUNCHPAD]
    }

    async fn run(&self, context: &Context) -> Result<ContextDelta, AgentError> {
        let location = self.resolve_location(context).ok_or_else(|| {
            AgentError::MissingDependency(
                "no launchpad location in context and no fallback location configured".into(),
            )
        })?;

        let report = match self.api_key.as_deref() {
            Some(key) => self.fetch(&location, key).await?,
            None => {
                debug!(location = %location, "No OpenWeatherMap key, using mock weather");
                mock_weather(&location)
            }
        };

        let suitability = assess_launch_conditions(&report);
        info!(
            location = %report.location,
            recommendation = ?suitability.recommendation,
            "Weather analysis complete"
        );

        let weather = serde_json::to_value(&report)
            .map_err(|e| AgentError::InvalidResponse(e.to_string()))?;
        let suitability = serde_json::to_value(&suitability)
            .map_err(|e| AgentError::InvalidResponse(e.to_string()))?;

        Ok(ContextDelta::new()
            .with(keys::WEATHER, weather)
            .with(keys::LAUNCH_SUITABILITY, suitability))
    }
}
