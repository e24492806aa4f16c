//! Shared mock agents for orchestrator tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use goalchain_core::{Agent, AgentError, AgentId, AgentRegistry, Context, ContextDelta};

type Responder = dyn Fn(&Context, u32) -> Result<ContextDelta, AgentError> + Send + Sync;

/// A mock agent whose behavior is a closure of `(context, call number)`.
///
/// Call numbers start at 1.
pub struct MockAgent {
    id: AgentId,
    responder: Box<Responder>,
    calls: AtomicU32,
}

impl MockAgent {
    pub fn new<F>(id: AgentId, responder: F) -> Self
    where
        F: Fn(&Context, u32) -> Result<ContextDelta, AgentError> + Send + Sync + 'static,
    {
        Self {
            id,
            responder: Box::new(responder),
            calls: AtomicU32::new(0),
        }
    }

    /// Always succeeds, writing `key = "<id> data"`.
    pub fn succeeding(id: AgentId, key: &'static str) -> Self {
        Self::new(id, move |_, _| {
            Ok(ContextDelta::new().with(key, format!("{id} data")))
        })
    }

    /// Always fails with the given error.
    pub fn failing(id: AgentId, error: AgentError) -> Self {
        Self::new(id, move |_, _| Err(error.clone()))
    }

    /// Fails with `error` for the first `failures` calls, then succeeds.
    pub fn flaky(id: AgentId, failures: u32, error: AgentError, key: &'static str) -> Self {
        Self::new(id, move |_, call| {
            if call <= failures {
                Err(error.clone())
            } else {
                Ok(ContextDelta::new().with(key, call))
            }
        })
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Agent for MockAgent {
    fn id(&self) -> AgentId {
        self.id
    }

    fn description(&self) -> &str {
        "mock"
    }

    async fn run(&self, context: &Context) -> Result<ContextDelta, AgentError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        (self.responder)(context, call)
    }
}

/// Summarize stand-in that records which keys it saw.
pub fn summarizer() -> Arc<MockAgent> {
    Arc::new(MockAgent::new(AgentId::Summarize, |ctx, _| {
        let keys: Vec<&str> = ctx.keys().collect();
        Ok(ContextDelta::new().with("summary", format!("saw {}", keys.join(","))))
    }))
}

/// Registry holding the given mocks.
pub fn registry(agents: &[Arc<MockAgent>]) -> AgentRegistry {
    agents
        .iter()
        .fold(AgentRegistry::new(), |reg, agent| reg.with(agent.clone()))
}
