use crate::task::Task;
use chrono::{DateTime, Utc};

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// Something that was done at `timestamp`.
///
/// An action embeds a full snapshot of the task it was recorded against, not
/// just its name, so a later edit of the task does not rewrite history unless
/// the action is explicitly re-pointed with [`Action::with_task`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    timestamp: DateTime<Utc>,
    ref_task: Task,
    name: Option<String>,
    description: Option<String>,
    actor: Option<String>,
}

impl Action {
    pub fn new(timestamp: DateTime<Utc>, ref_task: Task) -> Self {
        Self {
            timestamp,
            ref_task,
            name: None,
            description: None,
            actor: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    /// Copy of this action pointing at `task` instead.
    pub fn with_task(&self, task: Task) -> Self {
        Self {
            ref_task: task,
            ..self.clone()
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn ref_task(&self) -> &Task {
        &self.ref_task
    }

    pub fn task_name(&self) -> &str {
        self.ref_task.name()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn actor(&self) -> Option<&str> {
        self.actor.as_deref()
    }

    pub fn references(&self, task: &Task) -> bool {
        self.ref_task.name() == task.name()
    }
}
