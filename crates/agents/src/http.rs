//! Shared HTTP plumbing for the agents.
//!
//! Every agent talks JSON over HTTPS. This wraps a `reqwest::Client` and
//! maps transport and status failures onto the [`AgentError`] kinds the
//! engine's retry policy understands.

use std::time::Duration;

use goalchain_core::AgentError;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Thin JSON-over-HTTP client with agent error classification.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("goalchain/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }

    /// GET `url` with query parameters and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, AgentError> {
        debug!(url, "Sending GET request");

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status().as_u16();
        if let Err(err) = classify_status(status) {
            let body = response.text().await.unwrap_or_default();
            warn!(url, status, body = %truncate(&body, 200), "Upstream returned error");
            return Err(err);
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AgentError::InvalidResponse(format!("Failed to decode {url}: {e}")))
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

/// Map an HTTP status code onto a failure kind. 2xx is success.
pub fn classify_status(status: u16) -> Result<(), AgentError> {
    match status {
        200..=299 => Ok(()),
        429 => Err(AgentError::RateLimited(format!("HTTP {status}"))),
        500..=599 => Err(AgentError::TransientNetwork(format!("HTTP {status}"))),
        _ => Err(AgentError::InvalidResponse(format!("HTTP {status}"))),
    }
}

fn classify_transport(err: reqwest::Error) -> AgentError {
    if err.is_builder() {
        AgentError::InvalidResponse(format!("Invalid request: {err}"))
    } else {
        // Timeouts, refused connections, resets
        AgentError::TransientNetwork(err.to_string())
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
