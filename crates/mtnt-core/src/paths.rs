use crate::error::{Result, TrackerError};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const APP_NAME: &str = "mtnt";
pub const APP_DIR_ENV: &str = "MTNT_HOME";

pub const CONFIG_FILE: &str = "config.yaml";
pub const DEFAULT_DATA_DIR: &str = ".";
pub const DEFAULT_TASK_LIST_FILE: &str = "task_list.json";
pub const DEFAULT_ACTION_LIST_FILE: &str = "action_list.json";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

/// `$HOME/.config/mtnt`.
pub fn default_app_dir() -> Result<PathBuf> {
    let home = home::home_dir().ok_or(TrackerError::HomeNotFound)?;
    Ok(home.join(".config").join(APP_NAME))
}

pub fn config_path(app_dir: &Path) -> PathBuf {
    app_dir.join(CONFIG_FILE)
}

/// Resolve `data_dir` against `app_dir` unless it is already absolute.
pub fn resolve_data_dir(app_dir: &Path, data_dir: &Path) -> PathBuf {
    if data_dir.is_absolute() {
        data_dir.to_path_buf()
    } else {
        app_dir.join(data_dir)
    }
}
