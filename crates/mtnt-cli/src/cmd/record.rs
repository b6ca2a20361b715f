use super::{find_task, load_tracker, resolve_when};
use crate::output::{action_json, fmt_time, print_json};
use anyhow::Context;
use mtnt_core::config::Config;
use mtnt_core::{Action, RunOutcome};

pub struct RecordArgs {
    pub task: String,
    pub at: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub actor: Option<String>,
}

pub fn run(config: &Config, args: RecordArgs, json: bool) -> anyhow::Result<()> {
    let mut tracker = load_tracker(config)?;
    let when = resolve_when(args.at.as_deref())?;
    let task = find_task(&tracker, &args.task)?.clone();

    let mut action = Action::new(when, task);
    if let Some(name) = args.name {
        action = action.with_name(name);
    }
    if let Some(description) = args.description {
        action = action.with_description(description);
    }
    if let Some(actor) = args.actor {
        action = action.with_actor(actor);
    }

    let outcome = tracker
        .record_run(action.clone())
        .with_context(|| format!("failed to record run of '{}'", args.task))?;
    tracker.save().context("failed to save tracker")?;

    if outcome == RunOutcome::TaskMismatch {
        eprintln!(
            "warning: recorded task for '{}' differs from the registered one",
            args.task
        );
    }

    if json {
        let mut value = action_json(&action);
        value["outcome"] = serde_json::json!(match outcome {
            RunOutcome::Success => "success",
            RunOutcome::TaskMismatch => "task_mismatch",
            RunOutcome::Seeded => "seeded",
        });
        print_json(&value)?;
    } else {
        println!(
            "Recorded run of '{}' at {}",
            args.task,
            fmt_time(Some(action.timestamp()))
        );
    }
    Ok(())
}
