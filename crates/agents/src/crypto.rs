//! Crypto agent: Bitcoin and Ethereum spot prices from CoinGecko.

use std::collections::BTreeMap;

use async_trait::async_trait;
use goalchain_core::{Agent, AgentError, AgentId, Context, ContextDelta};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::http::HttpClient;
use crate::keys;

const COINS: &str = "bitcoin,ethereum";

pub struct CryptoAgent {
    http: HttpClient,
    base_url: String,
}

impl CryptoAgent {
    pub fn new(http: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

/// Price of one coin, as returned by `/simple/price`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinQuote {
    pub usd: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usd_24h_change: Option<f64>,
}

#[async_trait]
impl Agent for CryptoAgent {
    fn id(&self) -> AgentId {
        AgentId::Crypto
    }

    fn description(&self) -> &str {
        "Fetches current Bitcoin and Ethereum prices in USD."
    }

    async fn run(&self, _context: &Context) -> Result<ContextDelta, AgentError> {
        let prices: BTreeMap<String, CoinQuote> = self
            .http
            .get_json(
                &format!("{}/simple/price", self.base_url),
                &[
                    ("ids", COINS),
                    ("vs_currencies", "usd"),
                    ("include_24hr_change", "true"),
                ],
            )
            .await?;

        if !prices.contains_key("bitcoin") {
            return Err(AgentError::InvalidResponse(
                "price response has no bitcoin quote".into(),
            ));
        }

        info!(coins = prices.len(), "Retrieved cryptocurrency prices");

        let value =
            serde_json::to_value(&prices).map_err(|e| AgentError::InvalidResponse(e.to_string()))?;
        Ok(ContextDelta::new().with(keys::CRYPTO_PRICES, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::spawn_server;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    #[tokio::test]
    async fn fetches_prices() {
        let router = Router::new().route(
            "/simple/price",
            get(|| async {
                Json(json!({
                    "bitcoin": {"usd": 67012.5, "usd_24h_change": -1.2},
                    "ethereum": {"usd": 2450.0, "usd_24h_change": 0.4}
                }))
            }),
        );
        let base = spawn_server(router).await;

        let delta = CryptoAgent::new(HttpClient::default(), base)
            .run(&Context::new())
            .await
            .unwrap();
        let prices = delta.get(keys::CRYPTO_PRICES).unwrap();
        assert_eq!(prices["bitcoin"]["usd"], 67012.5);
        assert_eq!(prices["ethereum"]["usd_24h_change"], 0.4);
    }

    #[tokio::test]
    async fn missing_bitcoin_is_invalid() {
        let router = Router::new().route(
            "/simple/price",
            get(|| async { Json(json!({"ethereum": {"usd": 2450.0}})) }),
        );
        let base = spawn_server(router).await;

        let err = CryptoAgent::new(HttpClient::default(), base)
            .run(&Context::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn rate_limit_is_retryable() {
        let router = Router::new().route(
            "/simple/price",
            get(|| async { StatusCode::TOO_MANY_REQUESTS }),
        );
        let base = spawn_server(router).await;

        let err = CryptoAgent::new(HttpClient::default(), base)
            .run(&Context::new())
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }
}
