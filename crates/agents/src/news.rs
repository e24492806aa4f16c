//! News agent: recent articles from NewsAPI.
//!
//! The search query is built from the launch name when the SpaceX agent ran
//! first. Without an API key, canned articles are returned.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use goalchain_core::{Agent, AgentError, AgentId, Context, ContextDelta};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::http::HttpClient;
use crate::keys;

const PAGE_SIZE: &str = "5";

pub struct NewsAgent {
    http: HttpClient,
    base_url: String,
    api_key: Option<String>,
}

impl NewsAgent {
    pub fn new(http: HttpClient, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }
}

/// One entry of the `news_articles` context list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(rename = "publishedAt", default)]
    pub published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    #[serde(default)]
    articles: Vec<Article>,
}

/// Search query for the current context.
pub fn search_query(context: &Context) -> String {
    match context
        .get(keys::LAUNCH)
        .and_then(|l| l.get("name"))
        .and_then(|n| n.as_str())
    {
        Some(name) => format!("SpaceX {name}"),
        None => "SpaceX launch".to_string(),
    }
}

fn canned_articles() -> Vec<Article> {
    let now = Utc::now();
    vec![
        Article {
            title: "SpaceX Prepares for Next Falcon 9 Launch".into(),
            description: Some(
                "SpaceX is preparing for its next Falcon 9 mission with careful weather monitoring."
                    .into(),
            ),
            url: "https://example.com/spacex-news-1".into(),
            published_at: Some(now.to_rfc3339()),
        },
        Article {
            title: "Weather Conditions Favorable for Upcoming Launch".into(),
            description: Some(
                "Meteorologists report favorable conditions for the scheduled launch.".into(),
            ),
            url: "https://example.com/weather-news-1".into(),
            published_at: Some((now - Duration::hours(2)).to_rfc3339()),
        },
    ]
}

#[async_trait]
impl Agent for NewsAgent {
    fn id(&self) -> AgentId {
        AgentId::News
    }

    fn description(&self) -> &str {
        "Fetches recent news articles related to the launch."
    }

    fn dependencies(&self) -> &[&'static str] {
        &[keys::LAUNCH]
    }

    async fn run(&self, context: &Context) -> Result<ContextDelta, AgentError> {
        let articles = match self.api_key.as_deref() {
            Some(key) => {
                let query = search_query(context);
                let response: NewsApiResponse = self
                    .http
                    .get_json(
                        &format!("{}/everything", self.base_url),
                        &[
                            ("q", query.as_str()),
                            ("sortBy", "publishedAt"),
                            ("pageSize", PAGE_SIZE),
                            ("apiKey", key),
                        ],
                    )
                    .await?;
                response.articles
            }
            None => {
                debug!("No NewsAPI key, using canned articles");
                canned_articles()
            }
        };

        info!(count = articles.len(), "Retrieved news articles");

        let value = serde_json::to_value(&articles)
            .map_err(|e| AgentError::InvalidResponse(e.to_string()))?;
        Ok(ContextDelta::new().with(keys::NEWS_ARTICLES, value))
    }
}
