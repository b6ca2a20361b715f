use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("a task named '{0}' already exists")]
    DuplicateName(String),

    #[error("index 0 is not valid: use -1 for the last programmed time or 1 for the next")]
    InvalidIndex,

    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("no action for task '{task}' at {timestamp}")]
    ActionNotFound {
        task: String,
        timestamp: DateTime<Utc>,
    },

    #[error("cannot delete task '{task}': {actions} action(s) still reference it")]
    DanglingReference { task: String, actions: usize },

    #[error("invalid task: {0}")]
    InvalidTask(String),

    #[error("codec error: {0}")]
    Codec(String),

    #[error("tracker has no storage attached")]
    NoStorage,

    #[error("home directory not found: set HOME or MTNT_HOME")]
    HomeNotFound,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
