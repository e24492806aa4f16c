//! Step outcomes and the trajectory, the audit trail of one run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::agent::AgentId;
use crate::context::ContextDelta;
use crate::error::ErrorKind;

/// Result of one plan step after the engine's retry policy ran its course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    Success {
        delta: ContextDelta,
        duration_ms: u64,
        attempts: u32,
    },
    Failure {
        kind: ErrorKind,
        message: String,
        attempts: u32,
        duration_ms: u64,
    },
}

impl StepOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            Self::Success { attempts, .. } | Self::Failure { attempts, .. } => *attempts,
        }
    }

    pub fn duration_ms(&self) -> u64 {
        match self {
            Self::Success { duration_ms, .. } | Self::Failure { duration_ms, .. } => *duration_ms,
        }
    }

    /// Error message for failed steps.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Failure { message, .. } => Some(message),
            Self::Success { .. } => None,
        }
    }

    /// The delta for successful steps.
    pub fn delta(&self) -> Option<&ContextDelta> {
        match self {
            Self::Success { delta, .. } => Some(delta),
            Self::Failure { .. } => None,
        }
    }
}

/// One `(agent, outcome)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryStep {
    pub agent: AgentId,
    pub outcome: StepOutcome,
}

/// Ordered record of every step of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    /// Unique run identifier.
    pub run_id: String,
    /// The goal this run was executing.
    pub goal: String,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the last step was recorded (None while running).
    pub finished_at: Option<DateTime<Utc>>,
    steps: Vec<TrajectoryStep>,
}

impl Trajectory {
    /// Start a new, empty trajectory for a goal.
    pub fn new(goal: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            goal: goal.into(),
            started_at: Utc::now(),
            finished_at: None,
            steps: Vec::new(),
        }
    }

    /// Append the outcome of the next plan step.
    pub fn record(&mut self, agent: AgentId, outcome: StepOutcome) {
        self.steps.push(TrajectoryStep { agent, outcome });
    }

    /// Mark the run as finished.
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn steps(&self) -> &[TrajectoryStep] {
        &self.steps
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrajectoryStep> {
        self.steps.iter()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn success_count(&self) -> usize {
        self.steps.iter().filter(|s| s.outcome.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.len() - self.success_count()
    }

    /// The outcome recorded for an agent, if it was part of the run.
    pub fn outcome_of(&self, agent: AgentId) -> Option<&StepOutcome> {
        self.steps
            .iter()
            .find(|s| s.agent == agent)
            .map(|s| &s.outcome)
    }

    pub fn succeeded(&self, agent: AgentId) -> bool {
        self.outcome_of(agent).is_some_and(StepOutcome::is_success)
    }

    /// Agents in execution order.
    pub fn agents(&self) -> Vec<AgentId> {
        self.steps.iter().map(|s| s.agent).collect()
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a TrajectoryStep;
    type IntoIter = std::slice::Iter<'a, TrajectoryStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn success() -> StepOutcome {
        StepOutcome::Success {
            delta: ContextDelta::new().with("k", 1),
            duration_ms: 5,
            attempts: 1,
        }
    }

    fn failure() -> StepOutcome {
        StepOutcome::Failure {
            kind: ErrorKind::TransientNetwork,
            message: "connection reset".into(),
            attempts: 3,
            duration_ms: 40,
        }
    }

    #[test]
    fn counts_and_lookup() {
        let mut t = Trajectory::new("goal");
        t.record(AgentId::SpaceX, failure());
        t.record(AgentId::Summarize, success());

        assert_eq!(t.len(), 2);
        assert_eq!(t.success_count(), 1);
        assert_eq!(t.failure_count(), 1);
        assert!(!t.succeeded(AgentId::SpaceX));
        assert!(t.succeeded(AgentId::Summarize));
        assert!(!t.succeeded(AgentId::Weather));
        assert_eq!(t.agents(), vec![AgentId::SpaceX, AgentId::Summarize]);
    }

    #[test]
    fn outcome_accessors() {
        let f = failure();
        assert_eq!(f.attempts(), 3);
        assert_eq!(f.error_message(), Some("connection reset"));
        assert!(f.delta().is_none());

        let s = success();
        assert!(s.is_success());
        assert_eq!(s.delta().unwrap().len(), 1);
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(failure()).unwrap();
        assert_eq!(json["status"], "failure");
        assert_eq!(json["kind"], "transient_network");
        assert_eq!(json["attempts"], 3);
    }

    #[test]
    fn finish_sets_timestamp() {
        let mut t = Trajectory::new("goal");
        assert!(t.finished_at.is_none());
        t.finish();
        assert!(t.finished_at.unwrap() >= t.started_at);
    }
}
