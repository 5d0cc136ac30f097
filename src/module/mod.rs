// src/module/mod.rs

//! Module streams: resolution and persisted state
//!
//! A module ships several streams (e.g. `nodejs:8`, `nodejs:10`), each with
//! numbered versions built from modulemd metadata. At most one stream per
//! module is enabled at a time; installing a profile pulls in the packages
//! that profile lists, filtered to the version's artifacts.
//!
//! # Lifecycle
//!
//! ```text
//! unconfigured -> enabled(stream) <-> disabled
//!                      |
//!                      v
//!                 locked(stream, version)
//! ```
//!
//! Enable, disable, lock and unlock persist immediately. Install and upgrade
//! only hand package requests to a [`PackageGoal`]; the resulting version
//! and profiles are written when the package transaction reaches its
//! post-install or verify step.
//!
//! # Example module config
//!
//! ```toml
//! name = "nodejs"
//! stream = "8"
//! version = 20180308
//! enabled = true
//! locked = false
//! profiles = ["default"]
//! ```

mod conf;
mod defaults;
mod goal;
mod listing;
mod metadata;
mod nsvap;
mod registry;
mod report;
mod state;
mod stream;
mod transaction;
mod version;

pub use conf::{MemoryConfStore, ModuleConf, ModuleConfDir, ModuleConfStore, MODULE_CONF_SUFFIX};
pub use defaults::{
    parse_defaults_yaml, read_module_defaults, ConfiguredDefaults, DefaultStreamPolicy,
    ModuleDefaults,
};
pub use goal::{GoalOp, PackageGoal, PlannedGoal};
pub use listing::{Column, ListFilter, PlainTable, TableRenderer, NOTHING_TO_SHOW};
pub use metadata::{
    parse_modules_yaml, ModuleArtifacts, ModuleMetadata, ModuleMetadataLoader,
    ModuleProfile, RepoHandle,
};
pub use nsvap::{ModuleSubject, Nsvap, NsvaForm};
pub use registry::{BatchReport, Missing, ModuleRegistry};
pub use report::{
    AssumeNo, AssumeYes, CollectingReporter, Confirm, ReportLevel, Reporter, TracingReporter,
};
pub use state::{EnableOutcome, InstalledVersion, Module, ModuleState};
pub use stream::ModuleStream;
pub use transaction::{ModuleTransaction, TransactionAction};
pub use version::ModuleVersion;
