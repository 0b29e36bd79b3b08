//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use guardiao_core::{config, logging};

mod commands;

#[derive(Parser)]
#[command(name = "guardiao")]
#[command(version)]
#[command(about = "Guardião Digital: family digital-safety companion")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Keep accounts in memory instead of the hosted identity provider
    /// (interactive gate only)
    #[arg(long)]
    offline: bool,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Sign in (or create an account) without the interactive screen.
    /// The password is read from stdin.
    Login {
        /// Account email
        #[arg(long, env = "GUARDIAO_EMAIL")]
        email: String,

        /// Create the account instead of signing in
        #[arg(long)]
        signup: bool,
    },

    /// Sign out and forget the stored session
    Logout,

    /// Show who is signed in
    Status,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let Cli { command, offline } = cli;

    // The in-memory store lives only as long as the interactive gate.
    if offline && command.is_some() {
        anyhow::bail!(
            "--offline only applies to the interactive gate.\n\
             Run `guardiao --offline` without a subcommand."
        );
    }

    // Config commands must work even when the existing file is broken.
    if let Some(Commands::Config { command }) = &command {
        return match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        };
    }

    let config = config::Config::load().context("load config")?;
    let _log_guard = logging::init_file_logging(&config::paths::logs_dir(), &config.log_level)
        .context("init logging")?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "guardiao starting");

    // default to the interactive gate
    let Some(command) = command else {
        return commands::gate::run(&config, offline).await;
    };

    match command {
        Commands::Login { email, signup } => {
            commands::session::login(&config, &email, signup).await
        }
        Commands::Logout => commands::session::logout(&config).await,
        Commands::Status => commands::session::status(),
        Commands::Config { .. } => Ok(()),
    }
}
