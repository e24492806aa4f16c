//! `goalchain demo`: run the bundled example goals one after another.

use std::path::Path;

use tracing::warn;

use super::run::render_report;

/// Example goals covering launch weather, launch news and crypto.
pub const DEMO_GOALS: [&str; 3] = [
    "Find the next SpaceX launch, check weather at that location, then summarize if it may be delayed",
    "Get news about SpaceX and summarize the current situation",
    "Check Bitcoin price and get related news",
];

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)
        .map_err(|e| format!("Failed to load config: {e}"))?;
    let orchestrator = super::build_orchestrator(&config);

    for goal in DEMO_GOALS {
        match orchestrator.run_goal(goal).await {
            Ok(run) => print!("{}", render_report(&run)),
            Err(e) => warn!(goal, "Goal aborted: {e}"),
        }
    }

    Ok(())
}
