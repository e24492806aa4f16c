//! The shared, append-only context that accumulates agent results.
//!
//! Agents only ever see a `&Context` and hand back a [`ContextDelta`].
//! The engine is the single owner and merges each delta in; existing
//! keys are never overwritten.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key under which the original goal text is stored.
pub const GOAL_KEY: &str = "goal";

/// Accumulated results of one run, keyed by string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context {
    entries: Map<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context seeded with the goal text.
    pub fn with_goal(goal: &str) -> Self {
        let mut entries = Map::new();
        entries.insert(GOAL_KEY.to_string(), Value::String(goal.to_string()));
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Convenience for string-valued keys.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Value::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The first key of `delta` that already exists here, if any.
    fn first_collision<'a>(&self, delta: &'a ContextDelta) -> Option<&'a str> {
        delta.keys().find(|k| self.entries.contains_key(*k))
    }

    /// Merge a delta in. All-or-nothing: on a collision nothing is inserted
    /// and the offending key is returned.
    pub fn merge(&mut self, delta: ContextDelta) -> std::result::Result<(), String> {
        if let Some(key) = self.first_collision(&delta) {
            return Err(key.to_string());
        }
        self.entries.extend(delta.entries);
        Ok(())
    }
}

/// New keys produced by a single agent run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextDelta {
    entries: Map<String, Value>,
}

impl ContextDelta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn with_goal_seeds_goal_key() {
        let ctx = Context::with_goal("next launch?");
        assert_eq!(ctx.get_str(GOAL_KEY), Some("next launch?"));
        assert_eq!(ctx.len(), 1);
    }

    #[test]
    fn merge_adds_new_keys() {
        let mut ctx = Context::with_goal("g");
        let delta = ContextDelta::new()
            .with("launch", json!({"name": "Starlink 12"}))
            .with("launchpad", json!({"locality": "Cape Canaveral"}));
        ctx.merge(delta).unwrap();
        assert_eq!(ctx.len(), 3);
        assert_eq!(ctx.get("launch").unwrap()["name"], "Starlink 12");
    }

    #[test]
    fn merge_rejects_collision_without_partial_insert() {
        let mut ctx = Context::with_goal("g");
        let delta = ContextDelta::new()
            .with("fresh", 1)
            .with(GOAL_KEY, "overwrite attempt");
        let err = ctx.merge(delta).unwrap_err();
        assert_eq!(err, GOAL_KEY);
        assert!(!ctx.contains("fresh"));
        assert_eq!(ctx.get_str(GOAL_KEY), Some("g"));
    }

    #[test]
    fn empty_delta_is_a_no_op() {
        let mut ctx = Context::new();
        ctx.merge(ContextDelta::new()).unwrap();
        assert!(ctx.is_empty());
    }
}
