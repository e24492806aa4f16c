//! # goalchain core
//!
//! Domain types, traits, and error definitions for the goalchain agent
//! orchestrator. Every other crate depends inward on this one.
//!
//! ## Design Philosophy
//!
//! The agent capability interface is a trait defined here; concrete agents
//! live in `goalchain-agents` and the planner/engine/evaluator live in
//! `goalchain-orchestrator`. This enables:
//! - Swapping real HTTP agents for mocks in tests
//! - A trajectory and context model shared by every layer
//! - Clean dependency graph (all crates depend inward on core)

pub mod agent;
pub mod context;
pub mod error;
pub mod event;
pub mod trajectory;

// Re-export key types at crate root for ergonomics
pub use agent::{Agent, AgentId, AgentRegistry};
pub use context::{Context, ContextDelta, GOAL_KEY};
pub use error::{AgentError, Error, ErrorKind, Result};
pub use event::{DomainEvent, EventBus};
pub use trajectory::{StepOutcome, Trajectory, TrajectoryStep};
