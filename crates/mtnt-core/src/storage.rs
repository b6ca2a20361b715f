use crate::codec;
use crate::collection::{ActionList, TaskList};
use crate::error::Result;
use crate::io;
use crate::paths;
use std::path::{Path, PathBuf};

/// Where the task and action lists live on disk.
///
/// Each collection is a separate JSON file in `data_dir`. A missing file
/// loads as an empty collection; use [`Storage::is_initialized`] to tell a
/// fresh directory from an empty one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Storage {
    data_dir: PathBuf,
    task_file: String,
    action_file: String,
}

impl Storage {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            task_file: paths::DEFAULT_TASK_LIST_FILE.to_string(),
            action_file: paths::DEFAULT_ACTION_LIST_FILE.to_string(),
        }
    }

    pub fn with_task_file(mut self, name: impl Into<String>) -> Self {
        self.task_file = name.into();
        self
    }

    pub fn with_action_file(mut self, name: impl Into<String>) -> Self {
        self.action_file = name.into();
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn task_path(&self) -> PathBuf {
        self.data_dir.join(&self.task_file)
    }

    pub fn action_path(&self) -> PathBuf {
        self.data_dir.join(&self.action_file)
    }

    pub fn is_initialized(&self) -> bool {
        self.task_path().exists() && self.action_path().exists()
    }

    // -----------------------------------------------------------------------
    // Load / save
    // -----------------------------------------------------------------------

    pub fn load_tasks(&self) -> Result<TaskList> {
        let path = self.task_path();
        match io::read_optional(&path)? {
            Some(data) => {
                let tasks = codec::tasks_from_json(&data)?;
                tracing::debug!(path = %path.display(), count = tasks.len(), "loaded tasks");
                Ok(tasks)
            }
            None => {
                tracing::debug!(path = %path.display(), "no task file, starting empty");
                Ok(TaskList::new())
            }
        }
    }

    pub fn load_actions(&self) -> Result<ActionList> {
        let path = self.action_path();
        match io::read_optional(&path)? {
            Some(data) => {
                let actions = codec::actions_from_json(&data)?;
                tracing::debug!(path = %path.display(), count = actions.len(), "loaded actions");
                Ok(actions)
            }
            None => {
                tracing::debug!(path = %path.display(), "no action file, starting empty");
                Ok(ActionList::new())
            }
        }
    }

    pub fn save_tasks(&self, tasks: &TaskList) -> Result<()> {
        let data = codec::tasks_to_json(tasks)?;
        io::atomic_write(&self.task_path(), data.as_bytes())
    }

    pub fn save_actions(&self, actions: &ActionList) -> Result<()> {
        let data = codec::actions_to_json(actions)?;
        io::atomic_write(&self.action_path(), data.as_bytes())
    }

    /// Write both files together through [`io::atomic_write_all`]. Both
    /// lists are serialized before anything touches the disk.
    pub fn save_all(&self, tasks: &TaskList, actions: &ActionList) -> Result<()> {
        let task_data = codec::tasks_to_json(tasks)?;
        let action_data = codec::actions_to_json(actions)?;
        let task_path = self.task_path();
        let action_path = self.action_path();
        io::atomic_write_all(&[
            (task_path.as_path(), task_data.as_bytes()),
            (action_path.as_path(), action_data.as_bytes()),
        ])
    }

    /// Delete both files. Missing files are logged and skipped.
    pub fn remove_files(&self) -> Result<()> {
        for path in [self.task_path(), self.action_path()] {
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::warn!(path = %path.display(), "tried removing file, but it didn't exist");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}
