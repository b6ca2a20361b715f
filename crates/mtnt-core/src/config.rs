use crate::error::Result;
use crate::io;
use crate::paths;
use crate::storage::Storage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Contents of `<app_dir>/config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the task and action files. Relative paths are
    /// resolved against the app directory.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub debug_logging: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_file: Option<String>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(paths::DEFAULT_DATA_DIR)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            debug_logging: false,
            task_file: None,
            action_file: None,
        }
    }
}

impl Config {
    /// Read the config file, falling back to defaults when it is missing.
    pub fn load(app_dir: &Path) -> Result<Self> {
        let path = paths::config_path(app_dir);
        match io::read_optional(&path)? {
            Some(data) => Ok(serde_yaml::from_str(&data)?),
            None => Ok(Self::default()),
        }
    }

    pub fn save(&self, app_dir: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        io::atomic_write(&paths::config_path(app_dir), data.as_bytes())
    }

    /// Load the config for `app_dir`, writing the default file on first use,
    /// then resolve `data_dir` and make sure it exists.
    pub fn init(app_dir: &Path) -> Result<Self> {
        io::ensure_dir(app_dir)?;
        let path = paths::config_path(app_dir);
        let default_yaml = serde_yaml::to_string(&Self::default())?;
        if io::write_if_missing(&path, default_yaml.as_bytes())? {
            tracing::info!(path = %path.display(), "wrote default config");
        }

        let mut config = Self::load(app_dir)?;
        config.data_dir = paths::resolve_data_dir(app_dir, &config.data_dir);
        io::ensure_dir(&config.data_dir)?;
        tracing::debug!(
            app_dir = %app_dir.display(),
            data_dir = %config.data_dir.display(),
            debug_logging = config.debug_logging,
            "initialized configuration"
        );
        Ok(config)
    }

    pub fn storage(&self) -> Storage {
        let mut storage = Storage::new(&self.data_dir);
        if let Some(name) = &self.task_file {
            storage = storage.with_task_file(name);
        }
        if let Some(name) = &self.action_file {
            storage = storage.with_action_file(name);
        }
        storage
    }
}
