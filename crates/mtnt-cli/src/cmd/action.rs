use super::{find_task, load_tracker};
use crate::output::{action_json, fmt_time, print_json, print_table};
use crate::parse::parse_date;
use anyhow::Context;
use chrono::Utc;
use clap::Subcommand;
use mtnt_core::config::Config;
use mtnt_core::{Action, SortOrder, TrackerError};

#[derive(Subcommand)]
pub enum ActionSubcommand {
    /// List recorded actions, oldest first
    List {
        /// Only show actions for this task
        #[arg(long)]
        task: Option<String>,
        /// Newest first
        #[arg(long)]
        desc: bool,
    },
    /// Delete the action recorded for a task at a given time
    Delete {
        task: String,
        #[arg(long)]
        at: String,
    },
}

pub fn run(config: &Config, subcmd: ActionSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ActionSubcommand::List { task, desc } => list(config, task.as_deref(), desc, json),
        ActionSubcommand::Delete { task, at } => delete(config, &task, &at, json),
    }
}

fn list(config: &Config, task: Option<&str>, desc: bool, json: bool) -> anyhow::Result<()> {
    let tracker = load_tracker(config)?;
    let order = if desc { SortOrder::Desc } else { SortOrder::Asc };

    let actions = match task {
        Some(name) => {
            let task = find_task(&tracker, name)?;
            tracker.get_actions_for_task(task, Some(order))
        }
        None => {
            let mut all = tracker.actions().clone();
            all.sort(order);
            all
        }
    };

    if json {
        let items: Vec<serde_json::Value> = actions.iter().map(action_json).collect();
        print_json(&items)?;
        return Ok(());
    }

    if actions.is_empty() {
        println!("No actions.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = actions
        .iter()
        .map(|a| {
            vec![
                a.task_name().to_string(),
                fmt_time(Some(a.timestamp())),
                a.name().unwrap_or("-").to_string(),
                a.actor().unwrap_or("-").to_string(),
            ]
        })
        .collect();
    print_table(&["TASK", "WHEN", "NAME", "ACTOR"], rows);
    Ok(())
}

fn delete(config: &Config, task: &str, at: &str, json: bool) -> anyhow::Result<()> {
    let mut tracker = load_tracker(config)?;
    let timestamp = parse_date(at, Utc::now())?;

    let action: Action = tracker
        .actions()
        .iter()
        .find(|a| a.task_name() == task && a.timestamp() == timestamp)
        .cloned()
        .ok_or_else(|| TrackerError::ActionNotFound {
            task: task.to_string(),
            timestamp,
        })?;

    tracker
        .delete_run(&action)
        .with_context(|| format!("failed to delete action of '{task}'"))?;
    tracker.save().context("failed to save tracker")?;

    if json {
        let mut value = action_json(&action);
        value["deleted"] = serde_json::json!(true);
        print_json(&value)?;
    } else {
        println!("Deleted action of '{task}' at {}", fmt_time(Some(timestamp)));
    }
    Ok(())
}
