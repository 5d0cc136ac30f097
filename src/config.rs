// src/config.rs

//! Settings for the module subsystem
//!
//! # Example modules.toml
//!
//! ```toml
//! [paths]
//! install_root = "/"
//! modules_dir = "/etc/dnf/modules.d"
//! defaults_dir = "/etc/dnf/modules.defaults.d"
//!
//! [defaults]
//! fallback_stream = "f28"
//!
//! [defaults.streams]
//! nodejs = "10"
//!
//! [[repo]]
//! id = "updates-modular"
//! cachedir = "/var/cache/dnf/updates-modular-3a1b2c"
//! ```

use crate::error::{Error, Result};
use crate::module::{
    read_module_defaults, ConfiguredDefaults, ModuleConfDir, ModuleRegistry, RepoHandle,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default settings file location
pub const DEFAULT_SETTINGS_PATH: &str = "/etc/conary/modules.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleSettings {
    #[serde(default)]
    pub paths: PathSettings,

    #[serde(default)]
    pub defaults: DefaultStreamSettings,

    /// Repositories whose module metadata is loaded
    #[serde(default, rename = "repo")]
    pub repos: Vec<RepoHandle>,
}

/// Filesystem locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSettings {
    #[serde(default = "default_install_root")]
    pub install_root: PathBuf,

    /// Module configs, relative to `install_root`
    #[serde(default = "default_modules_dir")]
    pub modules_dir: PathBuf,

    /// modulemd-defaults documents
    #[serde(default = "default_defaults_dir")]
    pub defaults_dir: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            install_root: default_install_root(),
            modules_dir: default_modules_dir(),
            defaults_dir: default_defaults_dir(),
        }
    }
}

fn default_install_root() -> PathBuf {
    PathBuf::from("/")
}

fn default_modules_dir() -> PathBuf {
    PathBuf::from("/etc/dnf/modules.d")
}

fn default_defaults_dir() -> PathBuf {
    PathBuf::from("/etc/dnf/modules.defaults.d")
}

/// Default stream selection when no stream is enabled
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefaultStreamSettings {
    /// Used for modules with neither an override nor distribution defaults
    #[serde(default)]
    pub fallback_stream: Option<String>,

    /// Module name -> stream, ahead of distribution defaults
    #[serde(default)]
    pub streams: BTreeMap<String, String>,
}

impl ModuleSettings {
    /// Filesystem config store under the install root
    pub fn conf_store(&self) -> ModuleConfDir {
        ModuleConfDir::under_root(&self.paths.install_root, &self.paths.modules_dir)
    }

    /// Defaults directory under the install root
    pub fn defaults_dir(&self) -> PathBuf {
        let dir = &self.paths.defaults_dir;
        self.paths
            .install_root
            .join(dir.strip_prefix("/").unwrap_or(dir))
    }

    pub fn default_policy(&self) -> ConfiguredDefaults {
        ConfiguredDefaults::new()
            .with_overrides(self.defaults.streams.clone())
            .with_fallback(self.defaults.fallback_stream.clone())
    }
}

impl ModuleRegistry {
    /// Registry with every configured repository, config and default loaded
    ///
    /// Repositories without module metadata are skipped with a warning.
    pub fn from_settings(settings: &ModuleSettings) -> Result<Self> {
        let mut registry =
            ModuleRegistry::new(settings.conf_store()).with_default_policy(settings.default_policy());

        for repo in &settings.repos {
            if let Err(e) = registry.load_modules(repo) {
                warn!("Skipping repository {}: {}", repo.id, e);
            }
        }
        registry.read_all_modules()?;
        registry.read_all_module_defaults(read_module_defaults(&settings.defaults_dir())?);
        Ok(registry)
    }
}

/// Parse settings from TOML text
pub fn parse_settings(content: &str) -> std::result::Result<ModuleSettings, toml::de::Error> {
    toml::from_str(content)
}

/// Load settings, falling back to defaults when the file does not exist
pub fn load_settings(path: Option<&Path>) -> Result<ModuleSettings> {
    let path = path.unwrap_or_else(|| Path::new(DEFAULT_SETTINGS_PATH));
    if !path.exists() {
        debug!("No settings at {}, using defaults", path.display());
        return Ok(ModuleSettings::default());
    }

    let content = std::fs::read_to_string(path)?;
    parse_settings(&content).map_err(|source| Error::ConfParse {
        path: path.display().to_string(),
        source,
    })
}
