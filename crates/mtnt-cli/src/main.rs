mod cmd;
mod human;
mod output;
mod parse;
mod root;

use anyhow::Context;
use clap::{Parser, Subcommand};
use cmd::{
    action::ActionSubcommand, config::ConfigSubcommand, record::RecordArgs,
    task::TaskSubcommand,
};
use mtnt_core::config::Config;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "mtnt",
    about = "Track recurring maintenance tasks and when they were last done",
    version,
    propagate_version = true
)]
struct Cli {
    /// Directory holding config.yaml (default: $HOME/.config/mtnt)
    #[arg(long, global = true, env = "MTNT_HOME")]
    config_dir: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Enable debug logging
    #[arg(long, global = true, short = 'v')]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage tasks
    Task {
        #[command(subcommand)]
        subcommand: TaskSubcommand,
    },

    /// Record that a task was performed
    Record {
        task: String,
        /// When it was performed (default: now)
        #[arg(long)]
        at: Option<String>,
        /// Short label for this run
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Who performed it
        #[arg(long)]
        actor: Option<String>,
    },

    /// List and delete recorded actions
    Action {
        #[command(subcommand)]
        subcommand: ActionSubcommand,
    },

    /// Show tasks falling due within a window
    Due {
        /// Window length; prefix with '-' to look backward (requires --all)
        #[arg(long, default_value = "1 day", allow_hyphen_values = true)]
        within: String,
        /// Reference time (default: now)
        #[arg(long)]
        at: Option<String>,
        /// List every occurrence in the window, not just the next one
        #[arg(long)]
        all: bool,
    },

    /// Show tasks whose last programmed time passed without a run
    Overdue {
        #[arg(long)]
        at: Option<String>,
    },

    /// Inspect the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let app_dir = root::resolve_app_dir(cli.config_dir.as_deref())?;

    // Subscriber goes up before `Config::init` so its events are emitted.
    // A malformed file is reported by `init`.
    let debug_logging = Config::load(&app_dir)
        .map(|c| c.debug_logging)
        .unwrap_or(false);
    let default_level = if cli.verbose || debug_logging {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::init(&app_dir)
        .with_context(|| format!("failed to load config from {}", app_dir.display()))?;

    tracing::debug!(app_dir = %app_dir.display(), data_dir = %config.data_dir.display(), "starting");

    match cli.command {
        Commands::Task { subcommand } => cmd::task::run(&config, subcommand, cli.json),
        Commands::Record {
            task,
            at,
            name,
            description,
            actor,
        } => cmd::record::run(
            &config,
            RecordArgs {
                task,
                at,
                name,
                description,
                actor,
            },
            cli.json,
        ),
        Commands::Action { subcommand } => cmd::action::run(&config, subcommand, cli.json),
        Commands::Due { within, at, all } => {
            cmd::due::run(&config, &within, at.as_deref(), all, cli.json)
        }
        Commands::Overdue { at } => cmd::overdue::run(&config, at.as_deref(), cli.json),
        Commands::Config { subcommand } => cmd::config::run(&app_dir, &config, subcommand, cli.json),
    }
}
