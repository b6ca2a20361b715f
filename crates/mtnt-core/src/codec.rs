//! Tagged JSON encoding for persisted records.
//!
//! Every value is written as an envelope `{"__type__": <kind>, ...fields}`.
//! Timestamps and durations are stored as explicit integer components so a
//! file never depends on locale, timezone formatting or floating point:
//!
//! ```json
//! {"__type__": "Task", "name": "filter", "description": "",
//!  "start_time": {"__type__": "datetime", "year": 2024, "month": 1, "day": 1,
//!                 "hour": 9, "minute": 0, "second": 0, "microsecond": 0},
//!  "interval": {"__type__": "timedelta", "days": 30, "seconds": 0, "microseconds": 0}}
//! ```
//!
//! Decoding an unknown `__type__`, or a known one where a different kind is
//! expected, is an error.

use crate::action::Action;
use crate::collection::{ActionList, TaskList};
use crate::error::{Result, TrackerError};
use crate::task::{delta_from_micros, total_micros, Task};
use chrono::{DateTime, Datelike, NaiveDate, TimeDelta, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

const MICROS_PER_SEC: i128 = 1_000_000;
const MICROS_PER_DAY: i128 = 86_400 * MICROS_PER_SEC;

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__type__")]
pub enum Record {
    #[serde(rename = "datetime")]
    DateTime(DateTimeFields),
    #[serde(rename = "timedelta")]
    TimeDelta(TimeDeltaFields),
    Task(TaskFields),
    Action(ActionFields),
}

impl Record {
    pub fn kind(&self) -> &'static str {
        match self {
            Record::DateTime(_) => "datetime",
            Record::TimeDelta(_) => "timedelta",
            Record::Task(_) => "Task",
            Record::Action(_) => "Action",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateTimeFields {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub microsecond: u32,
}

/// Normalized so that `0 <= seconds < 86400` and
/// `0 <= microseconds < 1_000_000`; only `days` carries the sign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeDeltaFields {
    pub days: i64,
    pub seconds: i64,
    pub microseconds: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskFields {
    pub name: String,
    pub description: String,
    pub start_time: Option<Box<Record>>,
    pub interval: Box<Record>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionFields {
    pub timestamp: Box<Record>,
    pub ref_task: Box<Record>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub actor: Option<String>,
}

fn unexpected(expected: &str, found: &Record) -> TrackerError {
    TrackerError::Codec(format!("expected {expected}, found {}", found.kind()))
}

// ---------------------------------------------------------------------------
// datetime
// ---------------------------------------------------------------------------

pub fn encode_datetime(value: DateTime<Utc>) -> Record {
    Record::DateTime(DateTimeFields {
        year: value.year(),
        month: value.month(),
        day: value.day(),
        hour: value.hour(),
        minute: value.minute(),
        second: value.second(),
        microsecond: value.timestamp_subsec_micros(),
    })
}

pub fn decode_datetime(record: Record) -> Result<DateTime<Utc>> {
    let f = match record {
        Record::DateTime(f) => f,
        other => return Err(unexpected("datetime", &other)),
    };
    NaiveDate::from_ymd_opt(f.year, f.month, f.day)
        .and_then(|d| d.and_hms_micro_opt(f.hour, f.minute, f.second, f.microsecond))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| TrackerError::Codec(format!("invalid datetime components: {f:?}")))
}

// ---------------------------------------------------------------------------
// timedelta
// ---------------------------------------------------------------------------

pub fn encode_timedelta(value: TimeDelta) -> Record {
    let total = total_micros(value);
    let rem = total.rem_euclid(MICROS_PER_DAY);
    Record::TimeDelta(TimeDeltaFields {
        // TimeDelta spans far fewer than i64::MAX days
        days: total.div_euclid(MICROS_PER_DAY) as i64,
        seconds: (rem / MICROS_PER_SEC) as i64,
        microseconds: (rem % MICROS_PER_SEC) as i64,
    })
}

pub fn decode_timedelta(record: Record) -> Result<TimeDelta> {
    let f = match record {
        Record::TimeDelta(f) => f,
        other => return Err(unexpected("timedelta", &other)),
    };
    let total = i128::from(f.days) * MICROS_PER_DAY
        + i128::from(f.seconds) * MICROS_PER_SEC
        + i128::from(f.microseconds);
    delta_from_micros(total)
        .ok_or_else(|| TrackerError::Codec(format!("timedelta out of range: {f:?}")))
}

// ---------------------------------------------------------------------------
// Task / Action
// ---------------------------------------------------------------------------

pub fn encode_task(task: &Task) -> Record {
    Record::Task(TaskFields {
        name: task.name().to_string(),
        description: task.description().to_string(),
        start_time: task.start_time().map(|t| Box::new(encode_datetime(t))),
        interval: Box::new(encode_timedelta(task.interval())),
    })
}

pub fn decode_task(record: Record) -> Result<Task> {
    let f = match record {
        Record::Task(f) => f,
        other => return Err(unexpected("Task", &other)),
    };
    let start_time = f.start_time.map(|r| decode_datetime(*r)).transpose()?;
    let interval = decode_timedelta(*f.interval)?;
    Task::new(f.name, f.description, start_time, interval)
}

pub fn encode_action(action: &Action) -> Record {
    Record::Action(ActionFields {
        timestamp: Box::new(encode_datetime(action.timestamp())),
        ref_task: Box::new(encode_task(action.ref_task())),
        name: action.name().map(str::to_string),
        description: action.description().map(str::to_string),
        actor: action.actor().map(str::to_string),
    })
}

pub fn decode_action(record: Record) -> Result<Action> {
    let f = match record {
        Record::Action(f) => f,
        other => return Err(unexpected("Action", &other)),
    };
    let mut action = Action::new(decode_datetime(*f.timestamp)?, decode_task(*f.ref_task)?);
    if let Some(name) = f.name {
        action = action.with_name(name);
    }
    if let Some(description) = f.description {
        action = action.with_description(description);
    }
    if let Some(actor) = f.actor {
        action = action.with_actor(actor);
    }
    Ok(action)
}

// ---------------------------------------------------------------------------
// Collections
// ---------------------------------------------------------------------------

pub fn tasks_to_json(tasks: &TaskList) -> Result<String> {
    let records: Vec<Record> = tasks.iter().map(encode_task).collect();
    Ok(serde_json::to_string_pretty(&records)?)
}

pub fn tasks_from_json(data: &str) -> Result<TaskList> {
    let records: Vec<Record> = serde_json::from_str(data)?;
    let tasks = records
        .into_iter()
        .map(decode_task)
        .collect::<Result<Vec<_>>>()?;
    TaskList::from_tasks(tasks)
}

pub fn actions_to_json(actions: &ActionList) -> Result<String> {
    let records: Vec<Record> = actions.iter().map(encode_action).collect();
    Ok(serde_json::to_string_pretty(&records)?)
}

pub fn actions_from_json(data: &str) -> Result<ActionList> {
    let records: Vec<Record> = serde_json::from_str(data)?;
    records.into_iter().map(decode_action).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
