// src/main.rs

use anyhow::Result;
use clap::Parser;
use conary_modules::module::ListFilter;
use std::path::Path;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let settings = conary_modules::load_settings(Some(Path::new(&cli.config)))?;

    match cli.command {
        Commands::List {
            pattern,
            enabled,
            disabled,
            installed,
        } => {
            let filter = if enabled {
                ListFilter::Enabled
            } else if disabled {
                ListFilter::Disabled
            } else if installed {
                ListFilter::Installed
            } else {
                ListFilter::All
            };
            commands::cmd_module_list(&settings, filter, pattern.as_deref())
        }
        Commands::Info { spec } => commands::cmd_module_info(&settings, &spec),
        Commands::Enable {
            specs,
            assume_yes,
            assume_no,
        } => commands::cmd_module_enable(&settings, &specs, assume_yes, assume_no),
        Commands::Disable { specs } => commands::cmd_module_disable(&settings, &specs),
        Commands::Install {
            specs,
            no_autoenable,
        } => commands::cmd_module_install(&settings, &specs, !no_autoenable),
        Commands::Upgrade { specs } => commands::cmd_module_upgrade(&settings, &specs),
        Commands::Lock { spec } => commands::cmd_module_lock(&settings, &spec),
        Commands::Unlock { spec } => commands::cmd_module_unlock(&settings, &spec),
    }
}
