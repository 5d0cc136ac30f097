// src/cli/mod.rs
//! CLI definitions for conary-module
//!
//! The actual command implementations are in the `commands` module.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "conary-module")]
#[command(author = "Conary Project")]
#[command(version)]
#[command(about = "Manage module streams of modular repositories", long_about = None)]
pub struct Cli {
    /// Path to the settings file
    #[arg(short, long, global = true, default_value = conary_modules::DEFAULT_SETTINGS_PATH)]
    pub config: String,

    /// Show debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List module streams and versions
    List {
        /// Module name pattern (glob)
        pattern: Option<String>,

        /// Only the enabled stream of each module
        #[arg(long, conflicts_with_all = ["disabled", "installed"])]
        enabled: bool,

        /// Only modules that are not enabled
        #[arg(long, conflicts_with = "installed")]
        disabled: bool,

        /// Only installed versions
        #[arg(long)]
        installed: bool,
    },

    /// Show full metadata of a module version
    Info {
        /// Module spec (name[-stream[-version]][.arch][/profile])
        spec: String,
    },

    /// Enable module streams
    Enable {
        #[arg(required = true)]
        specs: Vec<String>,

        /// Switch streams without asking
        #[arg(short = 'y', long = "assumeyes", conflicts_with = "assume_no")]
        assume_yes: bool,

        /// Never switch an already enabled stream
        #[arg(long = "assumeno")]
        assume_no: bool,
    },

    /// Disable modules
    Disable {
        #[arg(required = true)]
        specs: Vec<String>,
    },

    /// Plan installation of module profiles (plans only; the stream is enabled now)
    ///
    /// Prints the packages a transaction would install. With autoenable the
    /// resolved stream is enabled and saved immediately. Installed profiles
    /// are only recorded when a package transaction commits, which this
    /// command does not run.
    Install {
        #[arg(required = true)]
        specs: Vec<String>,

        /// Do not enable the stream of the installed module
        #[arg(long)]
        no_autoenable: bool,
    },

    /// Plan upgrades of installed module profiles (all enabled modules if none given)
    ///
    /// Prints the packages a transaction would upgrade; nothing is saved.
    Upgrade {
        specs: Vec<String>,
    },

    /// Pin a module to its installed version
    Lock {
        spec: String,
    },

    /// Remove a version pin
    Unlock {
        spec: String,
    },
}
