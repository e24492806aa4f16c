//! Trajectory evaluation.
//!
//! Everything in an [`EvaluationResult`] is derived from the trajectory
//! alone, so evaluating the same trajectory twice gives the same result.

use goalchain_config::ScoringConfig;
use goalchain_core::{AgentId, Trajectory};
use serde::{Deserialize, Serialize};

/// A failed step in the error report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepError {
    pub agent: AgentId,
    pub message: String,
}

/// How well a run satisfied its goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub goal_satisfied: bool,
    /// 0 to 100.
    pub satisfaction_score: f64,
    /// Percentage of steps that succeeded, 0 to 100.
    pub completion_rate: f64,
    /// Failures in trajectory order.
    pub errors: Vec<StepError>,
    pub total_agents: usize,
    pub successful_agents: usize,
    pub failed_agents: usize,
    /// Agents in the order they ran.
    pub agent_trajectory: Vec<AgentId>,
    /// Text written by the Summarize step, when it succeeded.
    pub summary: Option<String>,
    pub trajectory: Trajectory,
}

impl EvaluationResult {
    /// True when the planner found nothing to do for the goal.
    pub fn no_applicable_agents(&self) -> bool {
        self.trajectory.is_empty()
    }
}

/// Scores finished trajectories.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    config: ScoringConfig,
}

impl Evaluator {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn evaluate(&self, trajectory: &Trajectory) -> EvaluationResult {
        let total = trajectory.len();
        let successes = trajectory.success_count();
        let failures = trajectory.failure_count();

        let completion_rate = if total == 0 {
            0.0
        } else {
            successes as f64 / total as f64 * 100.0
        };

        let summarized = trajectory.succeeded(AgentId::Summarize);
        let bonus = if summarized {
            self.config.summarize_bonus
        } else {
            0.0
        };
        let satisfaction_score = (completion_rate - self.config.failure_penalty * failures as f64
            + bonus)
            .clamp(0.0, 100.0);

        let errors = trajectory
            .iter()
            .filter_map(|step| {
                step.outcome.error_message().map(|message| StepError {
                    agent: step.agent,
                    message: message.to_string(),
                })
            })
            .collect();

        let summary = trajectory
            .outcome_of(AgentId::Summarize)
            .and_then(|outcome| outcome.delta())
            .and_then(|delta| delta.get("summary"))
            .and_then(|value| value.as_str())
            .map(str::to_string);

        EvaluationResult {
            goal_satisfied: summarized
                && satisfaction_score >= self.config.satisfaction_threshold,
            satisfaction_score,
            completion_rate,
            errors,
            total_agents: total,
            successful_agents: successes,
            failed_agents: failures,
            agent_trajectory: trajectory.agents(),
            summary,
            trajectory: trajectory.clone(),
        }
    }
}
