//! Summarize agent. Folds everything gathered so far into one report.
//!
//! Pure: no network access. Each section is only emitted when the agent that
//! feeds it ran successfully, so partial runs still produce a summary.

use async_trait::async_trait;
use goalchain_core::{Agent, AgentError, AgentId, Context, ContextDelta};
use serde_json::Value;
use tracing::info;

use crate::keys;

const TOP_ARTICLES: usize = 3;
const EMPTY_SUMMARY: &str = "No data available for summary.";

pub struct SummarizeAgent;

#[async_trait]
impl Agent for SummarizeAgent {
    fn id(&self) -> AgentId {
        AgentId::Summarize
    }

    fn description(&self) -> &str {
        "Synthesizes all collected data into a final summary."
    }

    fn dependencies(&self) -> &[&'static str] {
        &[
            keys::LAUNCH,
            keys::LAUNCHPAD,
            keys::WEATHER,
            keys::LAUNCH_SUITABILITY,
            keys::NEWS_ARTICLES,
            keys::CRYPTO_PRICES,
        ]
    }

    async fn run(&self, context: &Context) -> Result<ContextDelta, AgentError> {
        let summary = build_summary(context);
        info!(chars = summary.len(), "Created summary");
        Ok(ContextDelta::new().with(keys::SUMMARY, summary))
    }
}

fn text(value: Option<&Value>, fallback: &str) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => fallback.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Render the summary for whatever the context currently holds.
pub fn build_summary(context: &Context) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(launch) = context.get(keys::LAUNCH) {
        let location = context
            .get(keys::LAUNCHPAD)
            .and_then(|p| p.get("name"));
        parts.push(format!(
            "SPACEX LAUNCH INFORMATION:\nMission: {}\nDate: {}\nLocation: {}\nDetails: {}",
            text(launch.get("name"), "Unknown"),
            text(launch.get("date_utc"), "Unknown"),
            text(location, "Unknown"),
            text(launch.get("details"), "No additional details available"),
        ));
    }

    if let Some(weather) = context.get(keys::WEATHER) {
        let suitability = context.get(keys::LAUNCH_SUITABILITY);
        parts.push(format!(
            "WEATHER ANALYSIS:\nLocation: {}\nCurrent Conditions: {}\nTemperature: {}°C\nWind Speed: {} m/s\nLaunch Suitability: {}\nRisk Level: {}",
            text(weather.get("location"), "Unknown"),
            text(weather.get("description"), "Unknown"),
            text(weather.get("temperature_c"), "Unknown"),
            text(weather.get("wind_speed"), "Unknown"),
            text(suitability.and_then(|s| s.get("recommendation")), "Unknown"),
            text(suitability.and_then(|s| s.get("risk_level")), "Unknown"),
        ));
    }

    if let Some(articles) = context.get(keys::NEWS_ARTICLES).and_then(Value::as_array) {
        if !articles.is_empty() {
            let mut section = String::from("RELATED NEWS:");
            for (i, article) in articles.iter().take(TOP_ARTICLES).enumerate() {
                section.push_str(&format!(
                    "\n{}. {}",
                    i + 1,
                    text(article.get("title"), "No title")
                ));
            }
            parts.push(section);
        }
    }

    if let Some(prices) = context.get(keys::CRYPTO_PRICES) {
        parts.push(format!(
            "CRYPTOCURRENCY PRICES:\nBitcoin: ${}\nEthereum: ${}",
            text(prices.get("bitcoin").and_then(|c| c.get("usd")), "Unknown"),
            text(prices.get("ethereum").and_then(|c| c.get("usd")), "Unknown"),
        ));
    }

    if let Some(suitability) = context.get(keys::LAUNCH_SUITABILITY) {
        let conclusion = match suitability.get("recommendation").and_then(Value::as_str) {
            Some("UNFAVORABLE") => "Launch may face delays due to weather conditions.",
            Some("CAUTION") => "Launch conditions require monitoring.",
            _ => "Conditions appear favorable for launch.",
        };
        parts.push(format!("CONCLUSION: {conclusion}"));
    }

    if parts.is_empty() {
        EMPTY_SUMMARY.to_string()
    } else {
        parts.join("\n\n")
    }
}
