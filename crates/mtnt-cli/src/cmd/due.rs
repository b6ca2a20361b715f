use super::{load_tracker, resolve_when};
use crate::human::{human_date, human_interval};
use crate::output::{fmt_time, print_json, print_table};
use crate::parse::parse_signed_interval;
use chrono::{DateTime, TimeDelta, Utc};
use mtnt_core::config::Config;
use mtnt_core::Task;

/// Show tasks falling due within `within` of `at`. A negative window looks
/// back from `at` and only makes sense with `all`: the next occurrence always
/// lies after `at`.
pub fn run(
    config: &Config,
    within: &str,
    at: Option<&str>,
    all: bool,
    json: bool,
) -> anyhow::Result<()> {
    let tracker = load_tracker(config)?;
    let when = resolve_when(at)?;
    let period = parse_signed_interval(within)?;
    if period < TimeDelta::zero() && !all {
        anyhow::bail!("a backward window ('{within}') only works with --all");
    }
    tracing::debug!(period = %human_interval(Some(period.abs())), all, "due query");

    let due: Vec<(&Task, Vec<DateTime<Utc>>)> = if all {
        tracker.tasks().get_all_tasks_due_period(period, Some(when))
    } else {
        tracker
            .tasks()
            .get_next_tasks_due_period(period, Some(when))
            .into_iter()
            .map(|(task, next)| (task, vec![next]))
            .collect()
    };

    if json {
        let items: Vec<serde_json::Value> = due
            .iter()
            .map(|(task, times)| {
                serde_json::json!({
                    "task": task.name(),
                    "times": times.iter().map(|t| t.to_rfc3339()).collect::<Vec<_>>(),
                })
            })
            .collect();
        print_json(&items)?;
        return Ok(());
    }

    if due.is_empty() {
        println!("Nothing due.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = due
        .iter()
        .flat_map(|(task, times)| {
            times.iter().map(move |t| {
                vec![
                    task.name().to_string(),
                    fmt_time(Some(*t)),
                    human_date(Some(*t), when),
                ]
            })
        })
        .collect();
    print_table(&["TASK", "DUE", ""], rows);
    Ok(())
}
