use crate::output::print_json;
use clap::Subcommand;
use mtnt_core::config::Config;
use mtnt_core::paths;
use std::path::Path;

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show the effective configuration
    Show,
    /// Print the path of the config file
    Path,
}

pub fn run(
    app_dir: &Path,
    config: &Config,
    subcmd: ConfigSubcommand,
    json: bool,
) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(app_dir, config, json),
        ConfigSubcommand::Path => {
            let path = paths::config_path(app_dir);
            if json {
                print_json(&serde_json::json!({ "config_path": path }))?;
            } else {
                println!("{}", path.display());
            }
            Ok(())
        }
    }
}

fn show(app_dir: &Path, config: &Config, json: bool) -> anyhow::Result<()> {
    let storage = config.storage();

    if json {
        print_json(&serde_json::json!({
            "config_path": paths::config_path(app_dir),
            "data_dir": config.data_dir,
            "debug_logging": config.debug_logging,
            "task_file": storage.task_path(),
            "action_file": storage.action_path(),
        }))?;
        return Ok(());
    }

    println!("Config:        {}", paths::config_path(app_dir).display());
    println!("Data dir:      {}", config.data_dir.display());
    println!("Task file:     {}", storage.task_path().display());
    println!("Action file:   {}", storage.action_path().display());
    println!("Debug logging: {}", config.debug_logging);
    Ok(())
}
