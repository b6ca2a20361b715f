pub mod action;
pub mod config;
pub mod due;
pub mod overdue;
pub mod record;
pub mod task;

use crate::parse;
use anyhow::Context;
use chrono::{DateTime, Utc};
use mtnt_core::config::Config;
use mtnt_core::{Task, Tracker};

pub fn load_tracker(config: &Config) -> anyhow::Result<Tracker> {
    let storage = config.storage();
    Tracker::load(storage).with_context(|| {
        format!(
            "failed to load tracker data from {}",
            config.data_dir.display()
        )
    })
}

pub fn find_task<'a>(tracker: &'a Tracker, name: &str) -> anyhow::Result<&'a Task> {
    tracker
        .get_task(name)
        .with_context(|| format!("task '{name}' not found"))
}

/// Resolve an optional `--at` argument; absent means now, rounded to the
/// minute like any other relative date.
pub fn resolve_when(at: Option<&str>) -> anyhow::Result<DateTime<Utc>> {
    let now = Utc::now();
    match at {
        Some(text) => Ok(parse::parse_date(text, now)?),
        None => Ok(parse::round_datetime(now)),
    }
}
