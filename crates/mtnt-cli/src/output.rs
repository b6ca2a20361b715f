use chrono::{DateTime, Local, Utc};
use mtnt_core::{Action, Task};
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let header_row: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{:width$}", h, width = widths[i]))
        .collect();
    println!("{}", header_row.join("  ").trim_end());

    let sep: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep.join("  "));

    for row in &rows {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let w = widths.get(i).copied().unwrap_or(0);
                format!("{:width$}", cell, width = w)
            })
            .collect();
        println!("{}", cells.join("  ").trim_end());
    }
}

/// Local wall-clock time, minute precision; `-` when absent.
pub fn fmt_time(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn task_json(task: &Task) -> serde_json::Value {
    serde_json::json!({
        "name": task.name(),
        "description": task.description(),
        "start_time": task.start_time().map(|t| t.to_rfc3339()),
        "interval_seconds": task.interval().num_seconds(),
    })
}

pub fn action_json(action: &Action) -> serde_json::Value {
    serde_json::json!({
        "task": action.task_name(),
        "timestamp": action.timestamp().to_rfc3339(),
        "name": action.name(),
        "description": action.description(),
        "actor": action.actor(),
    })
}
