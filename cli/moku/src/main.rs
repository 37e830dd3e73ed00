//! Moku CLI: inspect platforms, validate and export deployment configurations,
//! and manage the local device cache.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "moku", version, about = "Moku deployment configuration tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect catalog and custom platforms
    Platform {
        #[command(subcommand)]
        action: PlatformAction,
    },
    /// Validate the routing of a deployment configuration
    Validate {
        /// Deployment configuration (.toml)
        config: PathBuf,
        /// Report format (human, json)
        #[arg(long, default_value = "human")]
        report: String,
    },
    /// Export a deployment configuration without validating routing
    Export {
        /// Deployment configuration (.toml)
        config: PathBuf,
        /// Output format (json, toml)
        #[arg(long, default_value = "json")]
        format: String,
    },
    /// Manage the device cache
    Device {
        #[command(subcommand)]
        action: DeviceAction,
        /// Cache file (default: ~/.moku-deploy/device_cache.json)
        #[arg(long, global = true)]
        cache: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum PlatformAction {
    /// List catalog platforms and custom platforms in ./platforms
    List,
    /// Show details of a platform
    Describe {
        /// Platform id, name, or custom platform file stem
        name: String,
        /// Output format (default: human-readable, "toml" for TOML)
        #[arg(long)]
        format: Option<String>,
    },
    /// Print a template .platform.toml
    Template {
        /// Name of the new platform
        name: String,
    },
    /// Validate a .platform.toml file
    Check {
        /// Platform file
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum DeviceAction {
    /// List cached devices
    List,
    /// Find a device by IP, name, or serial number
    Find {
        identifier: String,
    },
    /// Remove every cached device
    Clear,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;

    match cli.command {
        Commands::Platform { action } => match action {
            PlatformAction::List => commands::platform::list(&cwd),
            PlatformAction::Describe { name, format } => {
                commands::platform::describe(&name, &cwd, format.as_deref())
            }
            PlatformAction::Template { name } => commands::platform::template(&name),
            PlatformAction::Check { file } => commands::platform::check(&file),
        },

        Commands::Validate { config, report } => commands::validate::run(&config, &report),

        Commands::Export { config, format } => commands::export::run(&config, &format),

        Commands::Device { action, cache } => {
            let cache_path = commands::device::cache_path(cache)?;
            match action {
                DeviceAction::List => commands::device::list(&cache_path),
                DeviceAction::Find { identifier } => {
                    commands::device::find(&cache_path, &identifier)
                }
                DeviceAction::Clear => commands::device::clear(&cache_path),
            }
        }
    }
}
