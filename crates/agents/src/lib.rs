//! Built-in data-fetching agents for goalchain.
//!
//! Each agent implements [`goalchain_core::Agent`] and enriches the shared
//! context with one slice of data: the next SpaceX launch, weather at the
//! launch site, related news, crypto prices, and finally a summary.
//!
//! Weather and news fall back to offline data when no API key is set, so a
//! fresh install can run end-to-end.

pub mod crypto;
pub mod http;
pub mod news;
pub mod spacex;
pub mod summarize;
pub mod weather;

use std::sync::Arc;
use std::time::Duration;

use goalchain_config::AgentsConfig;
use goalchain_core::AgentRegistry;

pub use crypto::CryptoAgent;
pub use http::HttpClient;
pub use news::NewsAgent;
pub use spacex::SpaceXAgent;
pub use summarize::SummarizeAgent;
pub use weather::WeatherAgent;

/// Context keys written by the built-in agents.
pub mod keys {
    pub const LAUNCH: &str = "launch";
    pub const LAUNCHPAD: &str = "launchpad";
    pub const WEATHER: &str = "weather";
    pub const LAUNCH_SUITABILITY: &str = "launch_suitability";
    pub const NEWS_ARTICLES: &str = "news_articles";
    pub const CRYPTO_PRICES: &str = "crypto_prices";
    pub const SUMMARY: &str = "summary";
}

/// Create a registry with every built-in agent, wired from config.
pub fn default_registry(config: &AgentsConfig) -> AgentRegistry {
    let http = HttpClient::new(Duration::from_secs(config.http_timeout_secs));

    AgentRegistry::new()
        .with(Arc::new(SpaceXAgent::new(http.clone(), &config.spacex_api_url)))
        .with(Arc::new(WeatherAgent::new(
            http.clone(),
            &config.weather_api_url,
            config.openweather_api_key.clone(),
            config.fallback_location.clone(),
        )))
        .with(Arc::new(NewsAgent::new(
            http.clone(),
            &config.news_api_url,
            config.news_api_key.clone(),
        )))
        .with(Arc::new(CryptoAgent::new(http, &config.crypto_api_url)))
        .with(Arc::new(SummarizeAgent))
}
