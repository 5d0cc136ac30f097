// src/lib.rs

//! Conary module streams
//!
//! Resolution and state tracking for modular repositories: parallel streams
//! of a package set, of which at most one per module is enabled.
//!
//! # Architecture
//!
//! - Resolution: user specs (`name-stream-version.arch/profile`) are read
//!   in every plausible way and resolved against enabled, default and
//!   locked state
//! - State: one TOML config per module, written on enable/disable/lock and
//!   once per package transaction for installs
//! - Delegation: package requests go to a `PackageGoal`; dependency
//!   solving and installation happen in the transaction engine

pub mod config;
mod error;
pub mod module;
pub mod version;

pub use config::{load_settings, ModuleSettings, DEFAULT_SETTINGS_PATH};
pub use error::{Error, Result};
pub use module::{
    BatchReport, EnableOutcome, ListFilter, Missing, Module, ModuleConfStore, ModuleRegistry,
    ModuleState, ModuleVersion, Nsvap, PackageGoal, TransactionAction,
};
pub use version::{Nevra, RpmVersion};
