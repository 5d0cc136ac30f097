// src/module/state.rs

//! A module: its streams plus persisted enable/lock/install state

use super::conf::ModuleConf;
use super::defaults::ModuleDefaults;
use super::report::{Confirm, Reporter};
use super::stream::ModuleStream;
use super::version::ModuleVersion;
use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;

/// Where a module stands, as derived from its persisted config
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleState {
    /// No config has ever been written
    Unconfigured,
    Disabled,
    Enabled { stream: String },
    Locked { stream: String, version: u64 },
}

impl fmt::Display for ModuleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleState::Unconfigured => write!(f, "unconfigured"),
            ModuleState::Disabled => write!(f, "disabled"),
            ModuleState::Enabled { stream } => write!(f, "enabled ({})", stream),
            ModuleState::Locked { stream, version } => {
                write!(f, "locked ({}, version {})", stream, version)
            }
        }
    }
}

/// Result of an enable request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnableOutcome {
    /// Config changed and needs persisting
    Enabled,
    /// The stream was already enabled
    Unchanged,
    /// Switching streams was declined; the old stream stays enabled
    Declined,
}

/// Stream and version selected by the last install or upgrade
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledVersion {
    pub stream: String,
    pub version: u64,
}

/// All streams of one module name
#[derive(Debug, Clone)]
pub struct Module {
    name: String,
    streams: BTreeMap<String, ModuleStream>,
    conf: Option<ModuleConf>,
    defaults: Option<ModuleDefaults>,
    /// Pending until the transaction commits
    installed: Option<InstalledVersion>,
    installed_profiles: Vec<String>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            streams: BTreeMap::new(),
            conf: None,
            defaults: None,
            installed: None,
            installed_profiles: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a version, creating its stream on first use
    pub fn add(&mut self, version: ModuleVersion) -> Result<()> {
        if version.name() != self.name {
            return Err(Error::StreamMismatch {
                expected: self.name.clone(),
                found: version.full_version(),
            });
        }
        match self.streams.get_mut(version.stream()) {
            Some(stream) => stream.add(version),
            None => {
                self.streams
                    .insert(version.stream().to_string(), ModuleStream::new(version));
                Ok(())
            }
        }
    }

    pub fn stream(&self, stream: &str) -> Option<&ModuleStream> {
        self.streams.get(stream)
    }

    /// Streams sorted by name
    pub fn streams(&self) -> impl Iterator<Item = &ModuleStream> {
        self.streams.values()
    }

    pub fn conf(&self) -> Option<&ModuleConf> {
        self.conf.as_ref()
    }

    /// The config, created empty on first use
    pub fn conf_mut(&mut self) -> &mut ModuleConf {
        let name = &self.name;
        self.conf.get_or_insert_with(|| ModuleConf::new(name.clone()))
    }

    pub fn set_conf(&mut self, conf: ModuleConf) {
        self.conf = Some(conf);
    }

    pub fn defaults(&self) -> Option<&ModuleDefaults> {
        self.defaults.as_ref()
    }

    pub fn set_defaults(&mut self, defaults: ModuleDefaults) {
        self.defaults = Some(defaults);
    }

    pub fn is_enabled(&self) -> bool {
        self.conf.as_ref().is_some_and(|c| c.enabled)
    }

    /// The enabled stream, if the module is enabled
    pub fn enabled_stream(&self) -> Option<&str> {
        self.conf
            .as_ref()
            .filter(|c| c.enabled)
            .and_then(|c| c.stream.as_deref())
    }

    /// Version pinned by a lock, if any
    pub fn locked_version(&self) -> Option<u64> {
        self.conf
            .as_ref()
            .filter(|c| c.locked)
            .and_then(|c| c.version)
    }

    pub fn state(&self) -> ModuleState {
        let Some(conf) = &self.conf else {
            return ModuleState::Unconfigured;
        };
        match (&conf.stream, conf.enabled) {
            (Some(stream), true) => match self.locked_version() {
                Some(version) => ModuleState::Locked {
                    stream: stream.clone(),
                    version,
                },
                None => ModuleState::Enabled {
                    stream: stream.clone(),
                },
            },
            _ => ModuleState::Disabled,
        }
    }

    /// Enable `stream`
    ///
    /// Switching away from a different enabled stream needs `assume_yes` or
    /// a positive confirmation; `assume_no` declines without asking. Lock
    /// state and installed profiles are left alone.
    pub fn enable(
        &mut self,
        stream: &str,
        assume_yes: bool,
        assume_no: bool,
        confirm: &dyn Confirm,
        reporter: &dyn Reporter,
    ) -> Result<EnableOutcome> {
        if !self.streams.contains_key(stream) {
            return Err(Error::NoStream {
                module: self.name.clone(),
                stream: stream.to_string(),
            });
        }

        match self.enabled_stream() {
            Some(current) if current == stream => return Ok(EnableOutcome::Unchanged),
            Some(_) if !assume_yes => {
                reporter.info(&format!("Enabling different stream for {}", self.name));
                let prompt = format!("Switch {} to stream {}?", self.name, stream);
                if assume_no || !confirm.confirm(&prompt) {
                    reporter.info(&format!("Stream not enabled. Skipping {}", stream));
                    return Ok(EnableOutcome::Declined);
                }
            }
            _ => {}
        }

        let conf = self.conf_mut();
        conf.stream = Some(stream.to_string());
        conf.enabled = true;
        Ok(EnableOutcome::Enabled)
    }

    /// Mark the module disabled, keeping stream, version, lock and profiles
    pub fn disable(&mut self) {
        self.conf_mut().enabled = false;
    }

    /// Record what an install or upgrade selected, pending commit
    pub fn mark_installed(&mut self, stream: &str, version: u64, profiles: &[String]) {
        self.installed = Some(InstalledVersion {
            stream: stream.to_string(),
            version,
        });
        self.installed_profiles.extend(profiles.iter().cloned());
    }

    pub fn installed(&self) -> Option<&InstalledVersion> {
        self.installed.as_ref()
    }

    /// Profiles installed in the running transaction, not yet persisted
    pub fn pending_profiles(&self) -> &[String] {
        &self.installed_profiles
    }

    /// Fold the pending install into the config
    ///
    /// An enabled stream is never replaced here; switching streams is the
    /// job of [`Module::enable`]. The installed version is only recorded when
    /// it belongs to the stream that ends up enabled.
    pub(crate) fn commit_installed(&mut self) {
        let installed = self.installed.take();
        let profiles = std::mem::take(&mut self.installed_profiles);

        let conf = self.conf_mut();
        if let Some(installed) = installed {
            if !conf.enabled || conf.stream.is_none() {
                conf.stream = Some(installed.stream.clone());
            }
            if conf.stream.as_deref() == Some(installed.stream.as_str()) {
                conf.version = Some(installed.version);
            }
        }
        conf.enabled = true;
        conf.profiles.extend(profiles);
    }

    /// Drop pending install state without persisting it
    pub(crate) fn discard_installed(&mut self) {
        self.installed = None;
        self.installed_profiles.clear();
    }
}
