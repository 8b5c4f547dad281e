mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use mindful_core::config::{debug_enabled, log_path};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mindful")]
#[command(about = "Lock down distracting sites until you state an intent", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Initialize mindful (seed the default block list)
    Init,
    /// Open an interactive browsing context
    Browse {
        /// Hostname to open right away
        host: Option<String>,
        /// Socket this context listens on
        #[arg(short, long)]
        socket: Option<PathBuf>,
    },
    /// Show the timer for a hostname
    Status {
        /// Hostname the observer is looking at
        host: String,
        /// Socket of the browsing context to ask
        #[arg(short, long)]
        socket: Option<PathBuf>,
        /// Refresh every second until Ctrl-C
        #[arg(short, long)]
        watch: bool,
    },
    /// Manage blocked sites
    Sites {
        #[command(subcommand)]
        action: SitesAction,
    },
    /// Show or set the warning delay in seconds
    Delay {
        seconds: Option<u32>,
        #[arg(short, long)]
        socket: Option<PathBuf>,
    },
    /// Ask a running browsing context to re-read settings
    Reload {
        #[arg(short, long)]
        socket: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum SitesAction {
    /// List blocked sites
    List,
    /// Block a site
    Add {
        domain: String,
        #[arg(short, long)]
        socket: Option<PathBuf>,
    },
    /// Unblock a site
    Remove {
        domain: String,
        #[arg(short, long)]
        socket: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if matches!(cli.command, Commands::Browse { .. }) {
        setup_browse_logging()?;
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level()))
            .format_timestamp_secs()
            .init();
    }

    match cli.command {
        Commands::Init => commands::init::init_command(),
        Commands::Browse { host, socket } => commands::browse::browse_command(host, socket).await,
        Commands::Status {
            host,
            socket,
            watch,
        } => commands::status::status_command(&host, socket, watch).await,
        Commands::Sites { action } => match action {
            SitesAction::List => commands::settings::handle_sites_list(),
            SitesAction::Add { domain, socket } => {
                commands::settings::handle_sites_add(&domain, socket).await
            }
            SitesAction::Remove { domain, socket } => {
                commands::settings::handle_sites_remove(&domain, socket).await
            }
        },
        Commands::Delay { seconds, socket } => match seconds {
            Some(seconds) => commands::settings::handle_delay_set(seconds, socket).await,
            None => commands::settings::handle_delay_show(),
        },
        Commands::Reload { socket } => commands::status::reload_command(socket).await,
    }
}

fn log_level() -> &'static str {
    if debug_enabled() {
        "debug"
    } else {
        "info"
    }
}

/// The interstitial owns the terminal, so a browsing context logs to a file.
fn setup_browse_logging() -> Result<()> {
    use std::fs::{create_dir_all, OpenOptions};

    let log_path = log_path()?;

    if let Some(parent) = log_path.parent() {
        create_dir_all(parent)?;
    }

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level()))
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .format_timestamp_secs()
        .init();

    Ok(())
}
