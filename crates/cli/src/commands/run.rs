//! `goalchain run`: plan, execute and evaluate one goal.

use std::path::Path;
use std::sync::Arc;

use goalchain_core::{DomainEvent, EventBus};
use goalchain_orchestrator::GoalRun;
use tokio::sync::broadcast::error::RecvError;

pub async fn run(
    config_path: Option<&Path>,
    goal: &str,
    json: bool,
    trace: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)
        .map_err(|e| format!("Failed to load config: {e}"))?;
    let mut orchestrator = super::build_orchestrator(&config);

    let printer = if trace {
        let bus = Arc::new(EventBus::default());
        let mut rx = bus.subscribe();
        orchestrator = orchestrator.with_event_bus(bus);
        Some(tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        let done = matches!(event.as_ref(), DomainEvent::RunCompleted { .. });
                        println!("  {}", describe_event(&event));
                        if done {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(n)) => println!("  ... {n} events skipped"),
                    Err(RecvError::Closed) => break,
                }
            }
        }))
    } else {
        None
    };

    let run = orchestrator.run_goal(goal).await?;

    // Dropping the orchestrator closes the bus so the printer can finish
    drop(orchestrator);
    if let Some(printer) = printer {
        let _ = printer.await;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&run.evaluation)?);
    } else {
        print!("{}", render_report(&run));
    }

    Ok(())
}

/// One-line description of a progress event.
pub fn describe_event(event: &DomainEvent) -> String {
    match event {
        DomainEvent::PlanCreated { plan, .. } => {
            let names: Vec<&str> = plan.iter().map(|a| a.as_str()).collect();
            if names.is_empty() {
                "📋 Plan: (empty)".to_string()
            } else {
                format!("📋 Plan: {}", names.join(" -> "))
            }
        }
        DomainEvent::StepStarted { agent, .. } => format!("▶  {agent} started"),
        DomainEvent::StepRetrying {
            agent,
            attempt,
            kind,
            backoff_ms,
            ..
        } => format!("↻  {agent} attempt {attempt} failed ({kind}), retrying in {backoff_ms}ms"),
        DomainEvent::StepCompleted {
            agent,
            new_keys,
            duration_ms,
            ..
        } => {
            if new_keys.is_empty() {
                format!("✅ {agent} done in {duration_ms}ms (nothing added)")
            } else {
                format!(
                    "✅ {agent} done in {duration_ms}ms, added {}",
                    new_keys.join(", ")
                )
            }
        }
        DomainEvent::StepFailed {
            agent,
            kind,
            message,
            attempts,
            ..
        } => format!("❌ {agent} failed after {attempts} attempt(s) ({kind}): {message}"),
        DomainEvent::RunCompleted {
            goal_satisfied,
            satisfaction_score,
            ..
        } => format!(
            "🏁 Run complete: satisfied={goal_satisfied}, score={satisfaction_score:.1}"
        ),
    }
}

/// Human-readable report of a finished run.
pub fn render_report(run: &GoalRun) -> String {
    let eval = &run.evaluation;
    let rule = "=".repeat(60);
    let mut out = String::new();

    out.push_str(&format!("\n{rule}\nGOAL: {}\n{rule}\n", run.goal));

    if eval.no_applicable_agents() {
        out.push_str("\n⚠️  No applicable agents for this goal.\n");
    }

    out.push_str("\nGOAL EVALUATION:\n");
    out.push_str(&format!("  Satisfied:          {}\n", eval.goal_satisfied));
    out.push_str(&format!(
        "  Satisfaction Score: {:.1}%\n",
        eval.satisfaction_score
    ));
    out.push_str(&format!("  Completion Rate:    {:.1}%\n", eval.completion_rate));
    out.push_str(&format!(
        "  Agents:             {} ok / {} failed / {} total\n",
        eval.successful_agents, eval.failed_agents, eval.total_agents
    ));
    let trajectory: Vec<&str> = eval.agent_trajectory.iter().map(|a| a.as_str()).collect();
    out.push_str(&format!("  Agent Trajectory:   {}\n", trajectory.join(" -> ")));

    if !eval.errors.is_empty() {
        out.push_str("\nERRORS:\n");
        for error in &eval.errors {
            out.push_str(&format!("  - {}: {}\n", error.agent, error.message));
        }
    }

    if let Some(summary) = &eval.summary {
        out.push_str(&format!("\nFINAL SUMMARY:\n{summary}\n"));
    }

    out
}
