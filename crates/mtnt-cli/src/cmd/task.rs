use super::{find_task, load_tracker, resolve_when};
use crate::human::{human_date, human_interval};
use crate::output::{fmt_time, print_json, print_table, task_json};
use crate::parse::{parse_date, parse_interval};
use anyhow::Context;
use chrono::Utc;
use clap::Subcommand;
use mtnt_core::config::Config;
use mtnt_core::{SortOrder, Task, TaskChanges};

#[derive(Subcommand)]
pub enum TaskSubcommand {
    /// Add a task to the tracker
    Add {
        name: String,
        /// First time the task falls due ("now", "2024-01-01 09:00", "in 3 days")
        #[arg(long, default_value = "now")]
        start: String,
        /// How often the task repeats ("30 days", "1h 30m"); omit for a one-shot task
        #[arg(long, default_value = "")]
        every: String,
        /// Register the task without a start time
        #[arg(long)]
        unscheduled: bool,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// List all tasks with their next programmed time
    List {
        /// Reference time (default: now)
        #[arg(long)]
        at: Option<String>,
    },
    /// Show full details for a single task
    Get {
        name: String,
        #[arg(long)]
        at: Option<String>,
    },
    /// Search tasks by name
    Search { query: String },
    /// Edit a task; its recorded actions follow the edit
    Edit {
        name: String,
        /// Rename the task
        #[arg(long = "name", value_name = "NEW_NAME")]
        new_name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        every: Option<String>,
        /// Clear the start time
        #[arg(long, conflicts_with = "start")]
        unschedule: bool,
    },
    /// Delete a task that has no recorded actions
    Delete { name: String },
}

pub fn run(config: &Config, subcmd: TaskSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        TaskSubcommand::Add {
            name,
            start,
            every,
            unscheduled,
            description,
        } => add(config, &name, &start, &every, unscheduled, &description, json),
        TaskSubcommand::List { at } => list(config, at.as_deref(), json),
        TaskSubcommand::Get { name, at } => get(config, &name, at.as_deref(), json),
        TaskSubcommand::Search { query } => search(config, &query, json),
        TaskSubcommand::Edit {
            name,
            new_name,
            description,
            start,
            every,
            unschedule,
        } => {
            let start_time = if unschedule {
                Some(None)
            } else {
                start
                    .map(|s| parse_date(&s, Utc::now()).map(Some))
                    .transpose()?
            };
            let changes = TaskChanges {
                name: new_name,
                description,
                start_time,
                interval: every.map(|e| parse_interval(&e)).transpose()?,
            };
            edit(config, &name, changes, json)
        }
        TaskSubcommand::Delete { name } => delete(config, &name, json),
    }
}

fn add(
    config: &Config,
    name: &str,
    start: &str,
    every: &str,
    unscheduled: bool,
    description: &str,
    json: bool,
) -> anyhow::Result<()> {
    let start_time = if unscheduled {
        None
    } else {
        Some(parse_date(start, Utc::now())?)
    };
    let interval = parse_interval(every)?;
    let task = Task::new(name, description, start_time, interval)?;

    let mut tracker = load_tracker(config)?;
    tracing::info!(task = %name, "adding task");
    tracker
        .register_task(task.clone())
        .with_context(|| format!("failed to add task '{name}'"))?;
    tracker.save().context("failed to save tracker")?;

    if json {
        print_json(&task_json(&task))?;
    } else {
        println!(
            "Added task '{name}': starts {}, repeats every {}",
            fmt_time(task.start_time()),
            human_interval(Some(task.interval()))
        );
    }
    Ok(())
}

fn list(config: &Config, at: Option<&str>, json: bool) -> anyhow::Result<()> {
    let tracker = load_tracker(config)?;
    let when = resolve_when(at)?;

    if json {
        let items: Vec<serde_json::Value> = tracker
            .tasks()
            .iter()
            .map(|t| {
                let mut value = task_json(t);
                value["next"] = serde_json::json!(t.next_programmed_time(when).map(|n| n.to_rfc3339()));
                value["overdue"] = serde_json::json!(tracker.check_overdue(t, Some(when)));
                value
            })
            .collect();
        print_json(&items)?;
        return Ok(());
    }

    if tracker.tasks().is_empty() {
        println!("No tasks.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = tracker
        .tasks()
        .iter()
        .map(|t| {
            vec![
                t.name().to_string(),
                fmt_time(t.start_time()),
                human_interval(Some(t.interval())),
                fmt_time(t.next_programmed_time(when)),
                if tracker.check_overdue(t, Some(when)) {
                    "yes".to_string()
                } else {
                    String::new()
                },
            ]
        })
        .collect();
    print_table(&["NAME", "START", "INTERVAL", "NEXT", "OVERDUE"], rows);
    Ok(())
}

fn get(config: &Config, name: &str, at: Option<&str>, json: bool) -> anyhow::Result<()> {
    let tracker = load_tracker(config)?;
    let when = resolve_when(at)?;
    let task = find_task(&tracker, name)?;
    let last_run = tracker.get_latest_task_run(task, Some(when));
    let runs = tracker.get_actions_for_task(task, Some(SortOrder::Asc));

    if json {
        let mut value = task_json(task);
        value["next"] = serde_json::json!(task.next_programmed_time(when).map(|n| n.to_rfc3339()));
        value["last_programmed"] =
            serde_json::json!(task.last_programmed_time(when).map(|n| n.to_rfc3339()));
        value["last_run"] = serde_json::json!(last_run.map(|a| a.timestamp().to_rfc3339()));
        value["runs"] = serde_json::json!(runs.len());
        value["overdue"] = serde_json::json!(tracker.check_overdue(task, Some(when)));
        print_json(&value)?;
        return Ok(());
    }

    println!("Task:        {}", task.name());
    if !task.description().is_empty() {
        println!("Description: {}", task.description());
    }
    println!("Start:       {}", fmt_time(task.start_time()));
    println!("Interval:    {}", human_interval(Some(task.interval())));
    println!(
        "Next:        {} ({})",
        fmt_time(task.next_programmed_time(when)),
        human_date(task.next_programmed_time(when), when)
    );
    match last_run {
        Some(run) => println!(
            "Last run:    {} ({})",
            fmt_time(Some(run.timestamp())),
            human_date(Some(run.timestamp()), when)
        ),
        None => println!("Last run:    (never)"),
    }
    println!("Runs:        {}", runs.len());
    println!(
        "Overdue:     {}",
        if tracker.check_overdue(task, Some(when)) {
            "yes"
        } else {
            "no"
        }
    );
    Ok(())
}

fn search(config: &Config, query: &str, json: bool) -> anyhow::Result<()> {
    let tracker = load_tracker(config)?;
    let matches = tracker.tasks().search(query);

    if json {
        let items: Vec<serde_json::Value> = matches.iter().map(|t| task_json(t)).collect();
        print_json(&items)?;
        return Ok(());
    }

    if matches.is_empty() {
        println!("No tasks matching '{}'.", query);
        return Ok(());
    }

    let rows: Vec<Vec<String>> = matches
        .into_iter()
        .map(|t| {
            vec![
                t.name().to_string(),
                human_interval(Some(t.interval())),
                t.description().to_string(),
            ]
        })
        .collect();
    print_table(&["NAME", "INTERVAL", "DESCRIPTION"], rows);
    Ok(())
}

fn edit(config: &Config, name: &str, changes: TaskChanges, json: bool) -> anyhow::Result<()> {
    if changes.is_empty() {
        anyhow::bail!("nothing to change: pass at least one of --name, --description, --start, --every, --unschedule");
    }

    let mut tracker = load_tracker(config)?;
    let old = find_task(&tracker, name)?.clone();
    let new_task = tracker
        .edit_task(&old, changes)
        .with_context(|| format!("failed to edit task '{name}'"))?;
    tracker.save().context("failed to save tracker")?;

    if json {
        print_json(&task_json(&new_task))?;
    } else {
        println!("Updated task '{}'", new_task.name());
    }
    Ok(())
}

fn delete(config: &Config, name: &str, json: bool) -> anyhow::Result<()> {
    let mut tracker = load_tracker(config)?;
    let task = find_task(&tracker, name)?.clone();
    tracker
        .delete_task(&task)
        .with_context(|| format!("failed to delete task '{name}'"))?;
    tracker.save().context("failed to save tracker")?;

    if json {
        print_json(&serde_json::json!({ "task": name, "deleted": true }))?;
    } else {
        println!("Deleted task '{name}'");
    }
    Ok(())
}
