//! Sequential execution engine.
//!
//! Walks a plan, runs each agent against the growing context and records
//! one [`StepOutcome`] per step. Agent failures are data: they land in the
//! trajectory and the run carries on. Only wiring defects (an unregistered
//! agent, a delta that would overwrite a key) abort with an [`Error`].
//!
//! Each step is a small state machine:
//!
//! ```text
//! Attempting(1) ──ok──────────────────────────────▶ Success
//!      │
//!      └─retryable err, attempts left─▶ RetryWait ──sleep──▶ Attempting(n+1)
//!      └─other err / attempts exhausted──────────────────────▶ Failure
//! ```

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use goalchain_config::EngineConfig;
use goalchain_core::{
    Agent, AgentError, AgentRegistry, Context, DomainEvent, Error, EventBus, GOAL_KEY, Result,
    StepOutcome, Trajectory,
};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::planner::ExecutionPlan;

/// Bounded exponential backoff for retryable agent failures.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts per step, first try included.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub multiplier: f64,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let ms = self.initial_backoff.as_millis() as f64 * self.multiplier.powi(exponent);
        let capped = ms.min(self.max_backoff.as_millis() as f64);
        Duration::from_millis(capped as u64)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

impl From<&EngineConfig> for RetryPolicy {
    fn from(config: &EngineConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            multiplier: config.backoff_multiplier,
            max_backoff: Duration::from_millis(config.max_backoff_ms),
        }
    }
}

enum StepState {
    Attempting { attempt: u32 },
    RetryWait { attempt: u32, error: AgentError },
}

/// Runs execution plans against a registry of agents.
pub struct ExecutionEngine {
    registry: Arc<AgentRegistry>,
    policy: RetryPolicy,
    event_bus: Option<Arc<EventBus>>,
}

impl ExecutionEngine {
    pub fn new(registry: Arc<AgentRegistry>, policy: RetryPolicy) -> Self {
        Self {
            registry,
            policy,
            event_bus: None,
        }
    }

    /// Publish step progress to an event bus.
    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Execute `plan` starting from `context`.
    ///
    /// Returns the final context and the trajectory. Every plan entry must
    /// have a registered agent; this is checked before anything runs.
    pub async fn execute(
        &self,
        plan: &ExecutionPlan,
        mut context: Context,
    ) -> Result<(Context, Trajectory)> {
        if let Some(missing) = plan.iter().find(|id| !self.registry.contains(**id)) {
            return Err(Error::AgentNotRegistered(*missing));
        }

        let goal = context.get_str(GOAL_KEY).unwrap_or_default().to_string();
        let mut trajectory = Trajectory::new(goal);
        let run_id = trajectory.run_id.clone();

        info!(run_id = %run_id, plan = %plan, "Executing plan");
        self.publish(DomainEvent::PlanCreated {
            run_id: run_id.clone(),
            plan: plan.steps().to_vec(),
            timestamp: Utc::now(),
        });

        for &agent_id in plan {
            let agent = self
                .registry
                .get(agent_id)
                .ok_or(Error::AgentNotRegistered(agent_id))?;

            self.publish(DomainEvent::StepStarted {
                run_id: run_id.clone(),
                agent: agent_id,
                timestamp: Utc::now(),
            });

            let outcome = self.run_step(&run_id, agent.as_ref(), &context).await;

            match &outcome {
                StepOutcome::Success {
                    delta,
                    duration_ms,
                    attempts,
                } => {
                    let new_keys: Vec<String> = delta.keys().map(str::to_string).collect();
                    context
                        .merge(delta.clone())
                        .map_err(|key| Error::ContextCollision {
                            agent: agent_id,
                            key,
                        })?;
                    debug!(agent = %agent_id, keys = ?new_keys, "Merged delta into context");
                    info!(agent = %agent_id, attempts, duration_ms, "Step succeeded");

                    self.publish(DomainEvent::StepCompleted {
                        run_id: run_id.clone(),
                        agent: agent_id,
                        new_keys,
                        duration_ms: *duration_ms,
                        timestamp: Utc::now(),
                    });
                }
                StepOutcome::Failure {
                    kind,
                    message,
                    attempts,
                    ..
                } => {
                    warn!(agent = %agent_id, %kind, attempts, "Step failed: {message}");
                    self.publish(DomainEvent::StepFailed {
                        run_id: run_id.clone(),
                        agent: agent_id,
                        kind: *kind,
                        message: message.clone(),
                        attempts: *attempts,
                        timestamp: Utc::now(),
                    });
                }
            }

            trajectory.record(agent_id, outcome);
        }

        trajectory.finish();
        info!(
            run_id = %run_id,
            succeeded = trajectory.success_count(),
            failed = trajectory.failure_count(),
            "Plan finished"
        );
        Ok((context, trajectory))
    }

    async fn run_step(&self, run_id: &str, agent: &dyn Agent, context: &Context) -> StepOutcome {
        let started = Instant::now();
        let agent_id = agent.id();
        let mut state = StepState::Attempting { attempt: 1 };

        loop {
            state = match state {
                StepState::Attempting { attempt } => {
                    debug!(agent = %agent_id, attempt, "Running agent");
                    match agent.run(context).await {
                        Ok(delta) => {
                            return StepOutcome::Success {
                                delta,
                                duration_ms: elapsed_ms(started),
                                attempts: attempt,
                            };
                        }
                        Err(error)
                            if error.is_retryable() && attempt < self.policy.max_attempts =>
                        {
                            StepState::RetryWait { attempt, error }
                        }
                        Err(error) => {
                            return StepOutcome::Failure {
                                kind: error.kind(),
                                message: error.to_string(),
                                attempts: attempt,
                                duration_ms: elapsed_ms(started),
                            };
                        }
                    }
                }
                StepState::RetryWait { attempt, error } => {
                    let backoff = self.policy.backoff(attempt);
                    warn!(
                        agent = %agent_id,
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        "Attempt failed, retrying: {error}"
                    );
                    self.publish(DomainEvent::StepRetrying {
                        run_id: run_id.to_string(),
                        agent: agent_id,
                        attempt,
                        kind: error.kind(),
                        backoff_ms: backoff.as_millis() as u64,
                        timestamp: Utc::now(),
                    });
                    tokio::time::sleep(backoff).await;
                    StepState::Attempting {
                        attempt: attempt + 1,
                    }
                }
            };
        }
    }

    fn publish(&self, event: DomainEvent) {
        if let Some(bus) = &self.event_bus {
            bus.publish(event);
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
