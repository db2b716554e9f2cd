//! dispatch CLI
//!
//! Direct mode launches one preset and exits; `--ui` opens the review
//! interface.

use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use tracing::{info, warn};

use dispatch_cli::app::{App, StatusKind};
use dispatch_cli::launch_cmd::{self, LaunchArgs};
use dispatch_cli::services::Services;
use dispatch_cli::tui;
use dispatch_core::config::{AppSettings, Config};
use dispatch_core::paths::DataPaths;
use dispatch_core::tracing_init::{init_file_tracing, init_tracing};

#[derive(Parser, Debug)]
#[command(name = "dispatch")]
#[command(
    version,
    about = "Fan coding agents out into git worktrees and terminal panes",
    long_about = None
)]
struct Cli {
    /// Repository to launch against (owner/name)
    #[arg(long)]
    repo: Option<String>,

    /// Branch prefix; a random suffix is appended per replica
    #[arg(long)]
    name: Option<String>,

    /// Prompt handed to every agent
    #[arg(long)]
    prompt: Option<String>,

    /// Preset to launch (defaults to the configured default)
    #[arg(long)]
    preset: Option<String>,

    /// Replicas per window; values above 1 override the preset
    #[arg(long = "n", default_value_t = 0)]
    n: i64,

    /// Open the interactive review interface
    #[arg(long)]
    ui: bool,

    /// Data directory holding repos, worktrees and settings
    #[arg(long, env = "DISPATCH_HOME")]
    data_dir: Option<PathBuf>,

    /// Default log level when RUST_LOG is not set
    #[arg(long, env = "DISPATCH_LOG", default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

impl Cli {
    fn filter(&self) -> String {
        let level = &self.log_level;
        format!("dispatch={level},dispatch_cli={level},dispatch_core={level}")
    }

    /// Required flags of a direct launch; prints usage and exits when one is missing.
    fn launch_args(&self) -> LaunchArgs {
        let missing: Vec<&str> = [
            ("--repo", &self.repo),
            ("--name", &self.name),
            ("--prompt", &self.prompt),
        ]
        .into_iter()
        .filter(|(_, v)| v.as_deref().is_none_or(|s| s.trim().is_empty()))
        .map(|(flag, _)| flag)
        .collect();
        if !missing.is_empty() {
            Self::command()
                .error(
                    ErrorKind::MissingRequiredArgument,
                    format!(
                        "missing {} (or pass --ui for the interactive interface)",
                        missing.join(", ")
                    ),
                )
                .exit();
        }
        LaunchArgs {
            repo: self.repo.clone().unwrap_or_default(),
            name: self.name.clone().unwrap_or_default(),
            prompt: self.prompt.clone().unwrap_or_default(),
            preset: self.preset.clone(),
            replicate_override: self.n,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let paths = DataPaths::resolve(cli.data_dir.clone())?;

    if cli.ui {
        // The interface owns the terminal, so logs go to a file.
        init_file_tracing(&cli.filter(), cli.log_json, &paths.log_file())?;
        info!(version = env!("CARGO_PKG_VERSION"), data_dir = %paths.root.display(), "Starting dispatch UI");
        let app = build_app(&paths);
        tui::run(app, Services::system(paths)).await
    } else {
        let args = cli.launch_args();
        init_tracing(&cli.filter(), cli.log_json);
        info!(version = env!("CARGO_PKG_VERSION"), "Starting dispatch");
        let services = Services::system(paths);
        tokio::task::spawn_blocking(move || launch_cmd::run(&services, args)).await?
    }
}

/// Load both config files for the interface. Problems become the initial
/// status line instead of aborting.
fn build_app(paths: &DataPaths) -> App {
    let mut problems = Vec::new();
    let config = match Config::load(&paths.presets_file()) {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            warn!(error = %e, "Failed to load presets");
            problems.push(format!("Preset file error: {e}"));
            Config::default()
        }
    };
    let settings = AppSettings::load(&paths.settings_file()).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load settings");
        problems.push(format!("Settings file error: {e}"));
        AppSettings::default()
    });

    let mut app = App::new(config, settings, paths.presets_file());
    if !problems.is_empty() {
        app.set_status(StatusKind::Error, problems.join("; "));
    }
    app
}
