//! `goalchain plan`: show which agents a goal would run.

use std::path::Path;

use goalchain_orchestrator::Planner;

pub fn run(config_path: Option<&Path>, goal: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)
        .map_err(|e| format!("Failed to load config: {e}"))?;
    let plan = Planner::new(config.planner).plan(goal);

    if plan.is_empty() {
        println!("⚠️  No applicable agents for: {goal}");
        return Ok(());
    }

    println!("📋 Plan for: {goal}");
    for (i, agent) in plan.iter().enumerate() {
        println!("  {}. {agent}", i + 1);
    }
    Ok(())
}
