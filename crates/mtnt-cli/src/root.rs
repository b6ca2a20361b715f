use mtnt_core::paths;
use std::path::{Path, PathBuf};

/// Resolve the app directory holding `config.yaml`.
///
/// Priority:
/// 1. `--config-dir` flag / `MTNT_HOME` env var (passed in as `explicit`)
/// 2. `$HOME/.config/mtnt`
pub fn resolve_app_dir(explicit: Option<&Path>) -> mtnt_core::Result<PathBuf> {
    match explicit {
        Some(p) => Ok(p.to_path_buf()),
        None => paths::default_app_dir(),
    }
}
