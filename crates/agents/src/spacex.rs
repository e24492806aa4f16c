//! SpaceX agent: next launch and its launchpad from the public SpaceX API.
//!
//! Writes `launch` and, when the launchpad lookup succeeds, `launchpad`.
//! A failed launchpad lookup is not fatal: downstream agents fall back.

use async_trait::async_trait;
use goalchain_core::{Agent, AgentError, AgentId, Context, ContextDelta};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::http::HttpClient;
use crate::keys;

pub struct SpaceXAgent {
    http: HttpClient,
    base_url: String,
}

impl SpaceXAgent {
    pub fn new(http: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LaunchResponse {
    name: String,
    date_utc: Option<String>,
    details: Option<String>,
    launchpad: Option<String>,
    rocket: Option<String>,
    success: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct LaunchpadResponse {
    full_name: Option<String>,
    locality: Option<String>,
    region: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

/// The `launch` context entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchInfo {
    pub name: String,
    pub date_utc: Option<String>,
    pub details: String,
    pub rocket: Option<String>,
    pub success: Option<bool>,
}

/// The `launchpad` context entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchpadInfo {
    pub name: String,
    pub locality: Option<String>,
    pub region: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[async_trait]
impl Agent for SpaceXAgent {
    fn id(&self) -> AgentId {
        AgentId::SpaceX
    }

    fn description(&self) -> &str {
        "Fetches the next SpaceX launch and the launchpad it flies from."
    }

    async fn run(&self, _context: &Context) -> Result<ContextDelta, AgentError> {
        let launch: LaunchResponse = self
            .http
            .get_json(&format!("{}/launches/next", self.base_url), &[])
            .await?;

        let info = LaunchInfo {
            name: launch.name,
            date_utc: launch.date_utc,
            details: launch
                .details
                .unwrap_or_else(|| "No details available".to_string()),
            rocket: launch.rocket,
            success: launch.success,
        };

        let mut delta = ContextDelta::new().with(keys::LAUNCH, to_value(&info)?);

        if let Some(pad_id) = launch.launchpad.as_deref() {
            match self
                .http
                .get_json::<LaunchpadResponse>(
                    &format!("{}/launchpads/{}", self.base_url, pad_id),
                    &[],
                )
                .await
            {
                Ok(pad) => {
                    let pad = LaunchpadInfo {
                        name: pad.full_name.unwrap_or_else(|| "Unknown".to_string()),
                        locality: pad.locality,
                        region: pad.region,
                        latitude: pad.latitude,
                        longitude: pad.longitude,
                    };
                    delta.insert(keys::LAUNCHPAD, to_value(&pad)?);
                }
                Err(e) => {
                    warn!(launchpad = pad_id, error = %e, "Launchpad lookup failed, continuing without it");
                }
            }
        }

        info!(launch = %info.name, "Retrieved next SpaceX launch");
        Ok(delta)
    }
}

fn to_value<T: Serialize>(value: &T) -> Result<serde_json::Value, AgentError> {
    serde_json::to_value(value).map_err(|e| AgentError::InvalidResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::spawn_server;
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    fn launch_body() -> serde_json::Value {
        json!({
            "name": "Starlink 10-4",
            "date_utc": "2026-11-01T12:00:00.000Z",
            "details": null,
            "launchpad": "5e9e4501f509094ba4566f84",
            "rocket": "5e9d0d95eda69973a809d1ec",
            "success": null
        })
    }

    #[tokio::test]
    async fn fetches_launch_and_launchpad() {
        let router = Router::new()
            .route("/launches/next", get(|| async { Json(launch_body()) }))
            .route(
                "/launchpads/{id}",
                get(|Path(id): Path<String>| async move {
                    assert_eq!(id, "5e9e4501f509094ba4566f84");
                    Json(json!({
                        "full_name": "Cape Canaveral Space Force Station Space Launch Complex 40",
                        "locality": "Cape Canaveral",
                        "region": "Florida",
                        "latitude": 28.5618571,
                        "longitude": -80.577366
                    }))
                }),
            );
        let base = spawn_server(router).await;

        let agent = SpaceXAgent::new(HttpClient::default(), base);
        let delta = agent.run(&Context::with_goal("next launch")).await.unwrap();

        let launch = delta.get(keys::LAUNCH).unwrap();
        assert_eq!(launch["name"], "Starlink 10-4");
        assert_eq!(launch["details"], "No details available");

        let pad = delta.get(keys::LAUNCHPAD).unwrap();
        assert_eq!(pad["locality"], "Cape Canaveral");
        assert_eq!(pad["region"], "Florida");
    }

    #[tokio::test]
    async fn launchpad_failure_is_not_fatal() {
        let router = Router::new()
            .route("/launches/next", get(|| async { Json(launch_body()) }))
            .route(
                "/launchpads/{id}",
                get(|| async { StatusCode::NOT_FOUND }),
            );
        let base = spawn_server(router).await;

        let agent = SpaceXAgent::new(HttpClient::default(), base);
        let delta = agent.run(&Context::new()).await.unwrap();

        assert!(delta.get(keys::LAUNCH).is_some());
        assert!(delta.get(keys::LAUNCHPAD).is_none());
    }

    #[tokio::test]
    async fn server_error_is_transient() {
        let router = Router::new().route(
            "/launches/next",
            get(|| async { StatusCode::BAD_GATEWAY }),
        );
        let base = spawn_server(router).await;

        let agent = SpaceXAgent::new(HttpClient::default(), base);
        let err = agent.run(&Context::new()).await.unwrap_err();
        assert!(matches!(err, AgentError::TransientNetwork(_)));
    }

    #[tokio::test]
    async fn malformed_launch_is_invalid_response() {
        let router = Router::new().route(
            "/launches/next",
            get(|| async { Json(json!({"unexpected": true})) }),
        );
        let base = spawn_server(router).await;

        let agent = SpaceXAgent::new(HttpClient::default(), base);
        let err = agent.run(&Context::new()).await.unwrap_err();
        assert!(matches!(err, AgentError::InvalidResponse(_)));
    }
}
