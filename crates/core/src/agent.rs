//! Agent trait: the capability interface every data-fetching agent implements.
//!
//! An agent reads the accumulated [`Context`] and either returns a
//! [`ContextDelta`] of new keys or a typed [`AgentError`]. Agents never
//! mutate the context themselves; the engine performs the merge.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::context::{Context, ContextDelta};
use crate::error::AgentError;

/// Identifies an agent in plans and trajectories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgentId {
    Planner,
    SpaceX,
    Weather,
    News,
    Crypto,
    Summarize,
}

impl AgentId {
    /// Data-fetching agents in planning priority order.
    pub const PRIORITY: [AgentId; 4] = [Self::SpaceX, Self::Weather, Self::News, Self::Crypto];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Planner => "Planner",
            Self::SpaceX => "SpaceX",
            Self::Weather => "Weather",
            Self::News => "News",
            Self::Crypto => "Crypto",
            Self::Summarize => "Summarize",
        }
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AgentId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "planner" => Ok(Self::Planner),
            "spacex" => Ok(Self::SpaceX),
            "weather" => Ok(Self::Weather),
            "news" => Ok(Self::News),
            "crypto" => Ok(Self::Crypto),
            "summarize" => Ok(Self::Summarize),
            other => Err(format!("unknown agent: {other}")),
        }
    }
}

/// The core Agent trait.
///
/// Implementations must be idempotent: the engine may call `run` again
/// with the same context after a retryable failure.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Which plan step this agent serves.
    fn id(&self) -> AgentId;

    /// A short description of what this agent contributes.
    fn description(&self) -> &str;

    /// Context keys this agent reads. Absent keys mean "skip enrichment"
    /// unless the agent cannot do its job without them.
    fn dependencies(&self) -> &[&'static str] {
        &[]
    }

    /// Run against the accumulated context.
    async fn run(&self, context: &Context) -> Result<ContextDelta, AgentError>;
}

/// A registry of available agents, keyed by [`AgentId`].
#[derive(Clone, Default)]
pub struct AgentRegistry {
    agents: HashMap<AgentId, Arc<dyn Agent>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self {
            agents: HashMap::new(),
        }
    }

    /// Register an agent. Replaces any existing agent with the same id.
    pub fn register(&mut self, agent: Arc<dyn Agent>) {
        let id = agent.id();
        tracing::debug!(agent = %id, "Registering agent");
        self.agents.insert(id, agent);
    }

    /// Builder-style register.
    pub fn with(mut self, agent: Arc<dyn Agent>) -> Self {
        self.register(agent);
        self
    }

    pub fn get(&self, id: AgentId) -> Option<Arc<dyn Agent>> {
        self.agents.get(&id).cloned()
    }

    pub fn contains(&self, id: AgentId) -> bool {
        self.agents.contains_key(&id)
    }

    /// Registered ids, sorted for stable output.
    pub fn ids(&self) -> Vec<AgentId> {
        let mut ids: Vec<AgentId> = self.agents.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

impl std::fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentRegistry")
            .field("agents", &self.ids())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A simple agent that echoes the goal back under a new key.
    struct EchoAgent;

    #[async_trait]
    impl Agent for EchoAgent {
        fn id(&self) -> AgentId {
            AgentId::News
        }
        fn description(&self) -> &str {
            "Echoes the goal"
        }
        fn dependencies(&self) -> &[&'static str] {
            &["goal"]
        }
        async fn run(&self, context: &Context) -> Result<ContextDelta, AgentError> {
            let goal = context
                .get_str("goal")
                .ok_or_else(|| AgentError::MissingDependency("goal".into()))?;
            Ok(ContextDelta::new().with("echo", goal))
        }
    }

    #[test]
    fn registry_register_and_lookup() {
        let registry = AgentRegistry::new().with(Arc::new(EchoAgent));
        assert!(registry.get(AgentId::News).is_some());
        assert!(registry.get(AgentId::Weather).is_none());
        assert_eq!(registry.ids(), vec![AgentId::News]);
    }

    #[tokio::test]
    async fn registered_agent_runs() {
        let registry = AgentRegistry::new().with(Arc::new(EchoAgent));
        let agent = registry.get(AgentId::News).unwrap();
        let delta = agent.run(&Context::with_goal("hello")).await.unwrap();
        assert_eq!(delta.get("echo").unwrap(), "hello");
    }

    #[tokio::test]
    async fn missing_dependency_is_reported() {
        let err = EchoAgent.run(&Context::new()).await.unwrap_err();
        assert!(matches!(err, AgentError::MissingDependency(_)));
    }

    #[test]
    fn agent_id_parses_case_insensitively() {
        assert_eq!("SPACEX".parse::<AgentId>().unwrap(), AgentId::SpaceX);
        assert_eq!("summarize".parse::<AgentId>().unwrap(), AgentId::Summarize);
        assert!("telegram".parse::<AgentId>().is_err());
    }

    #[test]
    fn agent_id_serializes_by_name() {
        assert_eq!(serde_json::to_string(&AgentId::SpaceX).unwrap(), "\"SpaceX\"");
        assert_eq!(serde_json::to_string(&AgentId::Crypto).unwrap(), "\"Crypto\"");
    }
}
