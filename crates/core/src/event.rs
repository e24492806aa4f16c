//! Domain event system: progress notifications for a running goal.
//!
//! The engine and orchestrator publish events as a run advances.
//! Anything interested (a CLI progress printer, a log shipper) subscribes
//! without the core knowing about it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::agent::AgentId;
use crate::error::ErrorKind;

/// All domain events in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    /// The planner produced a plan for a goal
    PlanCreated {
        run_id: String,
        plan: Vec<AgentId>,
        timestamp: DateTime<Utc>,
    },

    /// A plan step is about to run
    StepStarted {
        run_id: String,
        agent: AgentId,
        timestamp: DateTime<Utc>,
    },

    /// An attempt failed with a retryable error and will be retried
    StepRetrying {
        run_id: String,
        agent: AgentId,
        attempt: u32,
        kind: ErrorKind,
        backoff_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// A plan step succeeded
    StepCompleted {
        run_id: String,
        agent: AgentId,
        new_keys: Vec<String>,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// A plan step failed for good
    StepFailed {
        run_id: String,
        agent: AgentId,
        kind: ErrorKind,
        message: String,
        attempts: u32,
        timestamp: DateTime<Utc>,
    },

    /// The run finished and was evaluated
    RunCompleted {
        run_id: String,
        goal_satisfied: bool,
        satisfaction_score: f64,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for domain events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
pub struct EventBus {
    sender: broadcast::Sender<Arc<DomainEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: DomainEvent) {
        // No subscribers is fine
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DomainEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn event_bus_publish_subscribe() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(DomainEvent::StepCompleted {
            run_id: "run-1".into(),
            agent: AgentId::SpaceX,
            new_keys: vec!["launch".into()],
            duration_ms: 42,
            timestamp: Utc::now(),
        });

        let event = rx.recv().await.unwrap();
        match event.as_ref() {
            DomainEvent::StepCompleted { agent, new_keys, .. } => {
                assert_eq!(*agent, AgentId::SpaceX);
                assert_eq!(new_keys, &vec!["launch".to_string()]);
            }
            _ => panic!("Expected StepCompleted event"),
        }
    }

    #[test]
    fn event_bus_no_subscribers_doesnt_panic() {
        let bus = EventBus::new(16);
        bus.publish(DomainEvent::StepFailed {
            run_id: "run-1".into(),
            agent: AgentId::Crypto,
            kind: ErrorKind::RateLimited,
            message: "no subscribers".into(),
            attempts: 3,
            timestamp: Utc::now(),
        });
    }
}
