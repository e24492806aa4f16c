//! Goal orchestration for goalchain.
//!
//! A run goes **plan → execute → evaluate**:
//!
//! 1. The [`Planner`] maps the goal text to an ordered list of agents
//! 2. The [`ExecutionEngine`] runs them in order with retries, collecting
//!    a context and a trajectory
//! 3. The [`Evaluator`] scores the trajectory
//!
//! Agent failures never abort a run. [`Orchestrator::execute_goal`] only
//! returns `Err` for wiring defects in the agent registry.

pub mod engine;
pub mod evaluator;
pub mod planner;

#[cfg(test)]
pub(crate) mod test_helpers;

use std::sync::Arc;

use chrono::Utc;
use goalchain_config::AppConfig;
use goalchain_core::{AgentRegistry, Context, DomainEvent, EventBus, Result};
use serde::Serialize;
use tracing::info;

pub use engine::{ExecutionEngine, RetryPolicy};
pub use evaluator::{EvaluationResult, Evaluator, StepError};
pub use planner::{ExecutionPlan, Planner};

/// Everything produced by one goal run.
#[derive(Debug, Clone, Serialize)]
pub struct GoalRun {
    pub goal: String,
    pub plan: ExecutionPlan,
    pub context: Context,
    pub evaluation: EvaluationResult,
}

/// Entry point wiring planner, engine and evaluator together.
///
/// Holds only configuration and shared agent handles, so one instance can
/// serve concurrent goals.
pub struct Orchestrator {
    planner: Planner,
    engine: ExecutionEngine,
    evaluator: Evaluator,
    event_bus: Option<Arc<EventBus>>,
}

impl Orchestrator {
    pub fn new(planner: Planner, engine: ExecutionEngine, evaluator: Evaluator) -> Self {
        Self {
            planner,
            engine,
            evaluator,
            event_bus: None,
        }
    }

    /// Build from application config and a populated registry.
    pub fn from_config(config: &AppConfig, registry: AgentRegistry) -> Self {
        Self::new(
            Planner::new(config.planner.clone()),
            ExecutionEngine::new(Arc::new(registry), RetryPolicy::from(&config.engine)),
            Evaluator::new(config.scoring.clone()),
        )
    }

    /// Publish run progress to `event_bus`.
    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.engine = self.engine.with_event_bus(event_bus.clone());
        self.event_bus = Some(event_bus);
        self
    }

    /// Run a goal and return its evaluation.
    pub async fn execute_goal(&self, goal: &str) -> Result<EvaluationResult> {
        Ok(self.run_goal(goal).await?.evaluation)
    }

    /// Run a goal and keep the plan and final context alongside the evaluation.
    pub async fn run_goal(&self, goal: &str) -> Result<GoalRun> {
        let plan = self.planner.plan(goal);
        if plan.is_empty() {
            info!(goal, "No applicable agents for goal");
        } else {
            info!(goal, plan = %plan, "Planned goal");
        }

        let (context, trajectory) = self.engine.execute(&plan, Context::with_goal(goal)).await?;
        let evaluation = self.evaluator.evaluate(&trajectory);

        info!(
            run_id = %trajectory.run_id,
            satisfied = evaluation.goal_satisfied,
            score = evaluation.satisfaction_score,
            completion = evaluation.completion_rate,
            "Goal evaluated"
        );

        if let Some(bus) = &self.event_bus {
            bus.publish(DomainEvent::RunCompleted {
                run_id: trajectory.run_id.clone(),
                goal_satisfied: evaluation.goal_satisfied,
                satisfaction_score: evaluation.satisfaction_score,
                timestamp: Utc::now(),
            });
        }

        Ok(GoalRun {
            goal: goal.to_string(),
            plan,
            context,
            evaluation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{MockAgent, registry, summarizer};
    use goalchain_core::{AgentError, AgentId, ContextDelta, Error};

    fn orchestrator(agents: &[Arc<MockAgent>]) -> Orchestrator {
        Orchestrator::from_config(&AppConfig::default(), registry(agents))
    }

    fn launch_agents() -> (Arc<MockAgent>, Arc<MockAgent>) {
        let spacex = Arc::new(MockAgent::new(AgentId::SpaceX, |_, _| {
            Ok(ContextDelta::new()
                .with("launch", serde_json::json!({"name": "Crew-12"}))
                .with("launchpad", serde_json::json!({"locality": "Cape Canaveral"})))
        }));
        // Skips enrichment when there is no launchpad to look up
        let weather = Arc::new(MockAgent::new(AgentId::Weather, |ctx, _| {
            Ok(match ctx.get("launchpad") {
                Some(_) => ContextDelta::new().with("weather", "clear"),
                None => ContextDelta::new(),
            })
        }));
        (spacex, weather)
    }

    #[tokio::test]
    async fn launch_weather_goal_is_satisfied() {
        let (spacex, weather) = launch_agents();
        let orchestrator = orchestrator(&[spacex, weather, summarizer()]);

        let result = orchestrator
            .execute_goal(
                "Find the next SpaceX launch, check weather at that location, \
                 then summarize if it may be delayed",
            )
            .await
            .unwrap();

        assert_eq!(
            result.agent_trajectory,
            vec![AgentId::SpaceX, AgentId::Weather, AgentId::Summarize]
        );
        assert_eq!(result.completion_rate, 100.0);
        assert!(result.goal_satisfied);
        assert!(result.errors.is_empty());
    }

    #[tokio::test]
    async fn unmatched_goal_invokes_nothing() {
        let (spacex, weather) = launch_agents();
        let summarize = summarizer();
        let orchestrator = orchestrator(&[spacex.clone(), weather.clone(), summarize.clone()]);

        let run = orchestrator.run_goal("Tell me a joke").await.unwrap();

        assert!(run.plan.is_empty());
        assert!(run.evaluation.no_applicable_agents());
        assert_eq!(run.evaluation.completion_rate, 0.0);
        assert!(!run.evaluation.goal_satisfied);
        assert_eq!(spacex.calls() + weather.calls() + summarize.calls(), 0);
        assert_eq!(run.context.get_str("goal"), Some("Tell me a joke"));
    }

    #[tokio::test(start_paused = true)]
    async fn spacex_outage_still_reaches_summary() {
        let spacex = Arc::new(MockAgent::failing(
            AgentId::SpaceX,
            AgentError::TransientNetwork("connection refused".into()),
        ));
        let (_, weather) = launch_agents();
        let summarize = summarizer();
        let orchestrator = orchestrator(&[spacex.clone(), weather.clone(), summarize.clone()]);

        let result = orchestrator
            .execute_goal("Will the spacex launch face weather delay?")
            .await
            .unwrap();

        assert_eq!(spacex.calls(), 3);
        assert_eq!(weather.calls(), 1);
        assert_eq!(summarize.calls(), 1);
        assert_eq!(result.failed_agents, 1);
        assert_eq!(result.errors[0].agent, AgentId::SpaceX);
        assert!(result.summary.is_some());
        assert!(!result.goal_satisfied);
    }

    #[tokio::test]
    async fn missing_registration_is_an_error() {
        let orchestrator = orchestrator(&[summarizer()]);
        let err = orchestrator.execute_goal("bitcoin price").await.unwrap_err();
        assert!(matches!(err, Error::AgentNotRegistered(AgentId::Crypto)));
    }

    #[tokio::test]
    async fn run_completed_event_published() {
        let bus = Arc::new(EventBus::default());
        let mut rx = bus.subscribe();
        let crypto = Arc::new(MockAgent::succeeding(AgentId::Crypto, "crypto_prices"));
        let orchestrator = orchestrator(&[crypto, summarizer()]).with_event_bus(bus.clone());

        orchestrator.execute_goal("btc").await.unwrap();

        let mut last = None;
        while let Ok(event) = rx.try_recv() {
            last = Some(event);
        }
        match last.as_deref() {
            Some(DomainEvent::RunCompleted {
                goal_satisfied,
                satisfaction_score,
                ..
            }) => {
                assert!(*goal_satisfied);
                assert_eq!(*satisfaction_score, 100.0);
            }
            other => panic!("expected RunCompleted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn concurrent_goals_keep_separate_runs() {
        let (spacex, weather) = launch_agents();
        let crypto = Arc::new(MockAgent::succeeding(AgentId::Crypto, "crypto_prices"));
        let summarize = summarizer();
        let orchestrator = orchestrator(&[spacex, weather, crypto, summarize.clone()]);

        let (launch, prices) = tokio::join!(
            orchestrator.run_goal("next spacex launch"),
            orchestrator.run_goal("bitcoin price"),
        );
        let (launch, prices) = (launch.unwrap(), prices.unwrap());

        assert_ne!(
            launch.evaluation.trajectory.run_id,
            prices.evaluation.trajectory.run_id
        );
        assert_eq!(
            launch.evaluation.agent_trajectory,
            vec![AgentId::SpaceX, AgentId::Summarize]
        );
        assert_eq!(
            prices.evaluation.agent_trajectory,
            vec![AgentId::Crypto, AgentId::Summarize]
        );
        assert!(launch.context.get("launch").is_some());
        assert!(launch.context.get("crypto_prices").is_none());
        assert!(prices.context.get("crypto_prices").is_some());
        assert!(prices.context.get("launch").is_none());
        assert_eq!(launch.context.get_str("goal"), Some("next spacex launch"));
        assert_eq!(prices.context.get_str("goal"), Some("bitcoin price"));
        assert_eq!(summarize.calls(), 2);
    }

    #[test]
    fn orchestrator_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Orchestrator>();
    }
}
