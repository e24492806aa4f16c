//! Rule-based planner.
//!
//! Maps a goal string to an ordered list of agents by case-insensitive
//! keyword matching. The output order is fixed by [`AgentId::PRIORITY`],
//! so the word order inside the goal never changes the plan.

use goalchain_config::PlannerConfig;
use goalchain_core::AgentId;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Keywords that select each data agent.
const TOPICS: &[(AgentId, &[&str])] = &[
    (AgentId::SpaceX, &["spacex", "launch", "rocket", "falcon", "dragon"]),
    (AgentId::Weather, &["weather", "forecast", "delay", "temperature"]),
    (AgentId::News, &["news", "article"]),
    (AgentId::Crypto, &["bitcoin", "crypto", "ethereum", "price", "btc"]),
];

/// Ordered, duplicate-free sequence of agents to run for one goal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<AgentId>", into = "Vec<AgentId>")]
pub struct ExecutionPlan {
    steps: Vec<AgentId>,
}

impl ExecutionPlan {
    /// Build a plan, dropping repeated agents and putting Summarize last
    /// when anything else was selected.
    pub fn new(agents: impl IntoIterator<Item = AgentId>) -> Self {
        let mut steps: Vec<AgentId> = Vec::new();
        for agent in agents {
            if agent != AgentId::Summarize && !steps.contains(&agent) {
                steps.push(agent);
            }
        }
        if !steps.is_empty() {
            steps.push(AgentId::Summarize);
        }
        Self { steps }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> &[AgentId] {
        &self.steps
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AgentId> {
        self.steps.iter()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn contains(&self, agent: AgentId) -> bool {
        self.steps.contains(&agent)
    }
}

impl From<Vec<AgentId>> for ExecutionPlan {
    fn from(agents: Vec<AgentId>) -> Self {
        Self::new(agents)
    }
}

impl From<ExecutionPlan> for Vec<AgentId> {
    fn from(plan: ExecutionPlan) -> Self {
        plan.steps
    }
}

impl<'a> IntoIterator for &'a ExecutionPlan {
    type Item = &'a AgentId;
    type IntoIter = std::slice::Iter<'a, AgentId>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

impl std::fmt::Display for ExecutionPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.steps.is_empty() {
            return write!(f, "(empty)");
        }
        let names: Vec<&str> = self.steps.iter().map(|a| a.as_str()).collect();
        write!(f, "{}", names.join(" -> "))
    }
}

/// Turns goals into execution plans.
#[derive(Debug, Clone, Default)]
pub struct Planner {
    config: PlannerConfig,
}

impl Planner {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    /// Plan a goal. An empty plan means no agent applies.
    pub fn plan(&self, goal: &str) -> ExecutionPlan {
        let goal = goal.to_lowercase();
        let matched: Vec<AgentId> = AgentId::PRIORITY
            .iter()
            .copied()
            .filter(|agent| matches_topic(*agent, &goal))
            .collect();

        let launch_matched = matched.contains(&AgentId::SpaceX);
        let selected = matched.into_iter().filter(|agent| {
            let keep = *agent != AgentId::Weather
                || !self.config.weather_requires_launch
                || launch_matched;
            if !keep {
                debug!("Dropping weather step, no launch in goal");
            }
            keep
        });

        ExecutionPlan::new(selected)
    }
}

fn matches_topic(agent: AgentId, goal: &str) -> bool {
    TOPICS
        .iter()
        .find(|(id, _)| *id == agent)
        .is_some_and(|(_, keywords)| keywords.iter().any(|k| goal.contains(k)))
}
