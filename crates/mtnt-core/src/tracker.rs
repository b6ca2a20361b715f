use crate::action::Action;
use crate::collection::{ActionList, SortOrder, TaskList};
use crate::error::{Result, TrackerError};
use crate::storage::Storage;
use crate::task::{Task, TaskChanges};
use chrono::{DateTime, TimeDelta, Utc};

// ---------------------------------------------------------------------------
// RunOutcome
// ---------------------------------------------------------------------------

/// Result of [`Tracker::record_run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The action was recorded and its task snapshot matches the registry.
    Success,
    /// The action was recorded, but its embedded task differs from the
    /// registered task of the same name.
    TaskMismatch,
    /// The task was unknown: it was registered from the action's snapshot and
    /// the action itself was not recorded.
    Seeded,
}

// ---------------------------------------------------------------------------
// Tracker
// ---------------------------------------------------------------------------

/// Owns the task and action lists and answers questions that need both.
///
/// Nothing is written to disk until [`Tracker::save`] is called.
#[derive(Debug, Default)]
pub struct Tracker {
    tasks: TaskList,
    actions: ActionList,
    storage: Option<Storage>,
}

impl Tracker {
    /// An empty tracker with nowhere to save to.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty tracker that saves to `storage`, ignoring what is already
    /// there.
    pub fn with_storage(storage: Storage) -> Self {
        Self {
            storage: Some(storage),
            ..Self::default()
        }
    }

    pub fn load(storage: Storage) -> Result<Self> {
        let tasks = storage.load_tasks()?;
        let actions = storage.load_actions()?;
        tracing::debug!(
            data_dir = %storage.data_dir().display(),
            tasks = tasks.len(),
            actions = actions.len(),
            "loaded tracker"
        );
        Ok(Self {
            tasks,
            actions,
            storage: Some(storage),
        })
    }

    /// Write both lists. Serialization and staging finish before either file
    /// is replaced, so an edit that renamed a task cannot leave the action
    /// file pointing at a name the task file never received, short of a
    /// failure between the two final renames.
    pub fn save(&self) -> Result<()> {
        let storage = self.storage.as_ref().ok_or(TrackerError::NoStorage)?;
        storage.save_all(&self.tasks, &self.actions)?;
        tracing::debug!(data_dir = %storage.data_dir().display(), "saved tracker");
        Ok(())
    }

    pub fn tasks(&self) -> &TaskList {
        &self.tasks
    }

    pub fn actions(&self) -> &ActionList {
        &self.actions
    }

    pub fn storage(&self) -> Option<&Storage> {
        self.storage.as_ref()
    }

    pub fn get_task(&self, name: &str) -> Option<&Task> {
        self.tasks.get(name)
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    pub fn register_task(&mut self, task: Task) -> Result<()> {
        tracing::debug!(task = %task.name(), "registering task");
        self.tasks.push(task)
    }

    /// Record that `action` was performed.
    ///
    /// The first action seen for an unknown task name only seeds the task
    /// registry; see [`RunOutcome::Seeded`].
    pub fn record_run(&mut self, action: Action) -> Result<RunOutcome> {
        let Some(registered) = self.tasks.get(action.task_name()) else {
            tracing::info!(
                task = %action.task_name(),
                "adding an action to a task that did not exist before"
            );
            self.tasks.push(action.ref_task().clone())?;
            return Ok(RunOutcome::Seeded);
        };

        let outcome = if registered == action.ref_task() {
            RunOutcome::Success
        } else {
            tracing::debug!(task = %action.task_name(), "action task differs from registered task");
            RunOutcome::TaskMismatch
        };
        self.actions.push(action);
        Ok(outcome)
    }

    /// Remove `task`. Refused while any action still references it by name.
    pub fn delete_task(&mut self, task: &Task) -> Result<()> {
        tracing::debug!(task = %task.name(), "deleting task");
        let dependents = self.actions.count_for(task);
        if dependents > 0 {
            tracing::error!(
                task = %task.name(),
                actions = dependents,
                "cannot delete task because it has actions that depend on it"
            );
            return Err(TrackerError::DanglingReference {
                task: task.name().to_string(),
                actions: dependents,
            });
        }
        self.tasks.remove(task)?;
        Ok(())
    }

    pub fn delete_run(&mut self, action: &Action) -> Result<()> {
        tracing::debug!(
            task = %action.task_name(),
            timestamp = %action.timestamp(),
            "deleting action"
        );
        self.actions.remove(action)?;
        Ok(())
    }

    /// Replace `old` with a copy carrying `changes`, re-pointing every action
    /// that referenced `old` at the new task.
    ///
    /// Either the task and all its actions move together or nothing changes:
    /// the edit is staged on copies of both lists and committed at the end.
    pub fn edit_task(&mut self, old: &Task, changes: TaskChanges) -> Result<Task> {
        let new_task = old.with_changes(changes)?;

        let mut tasks = self.tasks.clone();
        tasks.replace(old, new_task.clone())?;

        let mut migrated = 0;
        let actions: ActionList = self
            .actions
            .iter()
            .map(|a| {
                if a.references(old) {
                    migrated += 1;
                    a.with_task(new_task.clone())
                } else {
                    a.clone()
                }
            })
            .collect();

        self.tasks = tasks;
        self.actions = actions;
        tracing::info!(
            from = %old.name(),
            to = %new_task.name(),
            actions = migrated,
            "edited task"
        );
        Ok(new_task)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Actions recorded for `task` (matched by name), optionally sorted by
    /// timestamp.
    pub fn get_actions_for_task(&self, task: &Task, order: Option<SortOrder>) -> ActionList {
        let mut actions = self.actions.for_task(task);
        if let Some(order) = order {
            actions.sort(order);
        }
        actions
    }

    /// Most recent action for `task` at or before `when` (now if `None`).
    pub fn get_latest_task_run(&self, task: &Task, when: Option<DateTime<Utc>>) -> Option<&Action> {
        let when = when.unwrap_or_else(Utc::now);
        self.actions
            .iter()
            .filter(|a| a.references(task) && a.timestamp() <= when)
            .max_by_key(|a| a.timestamp())
    }

    /// A task is overdue when its last programmed time before `when` has
    /// passed without a run at or after it. Unscheduled tasks and tasks that
    /// have not started are never overdue.
    pub fn check_overdue(&self, task: &Task, when: Option<DateTime<Utc>>) -> bool {
        let when = when.unwrap_or_else(Utc::now);
        let Some(last_programmed) = task.last_programmed_time(when) else {
            return false;
        };
        if last_programmed >= when {
            return false;
        }
        match self.get_latest_task_run(task, Some(when)) {
            None => true,
            Some(run) => run.timestamp() < last_programmed,
        }
    }

    pub fn overdue_tasks(&self, when: Option<DateTime<Utc>>) -> Vec<&Task> {
        let when = when.unwrap_or_else(Utc::now);
        self.tasks
            .iter()
            .filter(|t| self.check_overdue(t, Some(when)))
            .collect()
    }

    /// Time between the latest run of `task` and `when`; `None` if it never
    /// ran.
    pub fn time_since_last_exec(
        &self,
        task: &Task,
        when: Option<DateTime<Utc>>,
    ) -> Option<TimeDelta> {
        let when = when.unwrap_or_else(Utc::now);
        self.get_latest_task_run(task, Some(when))
            .map(|run| when - run.timestamp())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
