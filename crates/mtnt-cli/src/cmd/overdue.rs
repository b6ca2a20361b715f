use super::{load_tracker, resolve_when};
use crate::human::human_date;
use crate::output::{fmt_time, print_json, print_table};
use mtnt_core::config::Config;

pub fn run(config: &Config, at: Option<&str>, json: bool) -> anyhow::Result<()> {
    let tracker = load_tracker(config)?;
    let when = resolve_when(at)?;
    let overdue = tracker.overdue_tasks(Some(when));

    if json {
        let items: Vec<serde_json::Value> = overdue
            .iter()
            .map(|t| {
                serde_json::json!({
                    "task": t.name(),
                    "due_since": t.last_programmed_time(when).map(|d| d.to_rfc3339()),
                    "last_run": tracker
                        .get_latest_task_run(t, Some(when))
                        .map(|a| a.timestamp().to_rfc3339()),
                })
            })
            .collect();
        print_json(&items)?;
        return Ok(());
    }

    if overdue.is_empty() {
        println!("Nothing overdue.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = overdue
        .iter()
        .map(|t| {
            let due_since = t.last_programmed_time(when);
            let last_run = tracker
                .get_latest_task_run(t, Some(when))
                .map(|a| a.timestamp());
            vec![
                t.name().to_string(),
                fmt_time(due_since),
                human_date(due_since, when),
                match last_run {
                    Some(_) => fmt_time(last_run),
                    None => "never".to_string(),
                },
            ]
        })
        .collect();
    print_table(&["TASK", "DUE SINCE", "", "LAST RUN"], rows);
    Ok(())
}
