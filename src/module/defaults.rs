// src/module/defaults.rs

//! Default streams and profiles
//!
//! When a spec names no stream and the module is not enabled, resolution
//! asks a [`DefaultStreamPolicy`]. The stock policy consults configured
//! overrides, then the distribution's `modulemd-defaults` documents, then an
//! optional global fallback stream.

use super::metadata::{parse_documents, string_or_number};
use super::Module;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Document type tag for module defaults
pub const DEFAULTS_DOCUMENT: &str = "modulemd-defaults";

/// Distribution defaults for one module
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDefaults {
    pub module: String,
    #[serde(default, deserialize_with = "optional_stream")]
    pub stream: Option<String>,
    /// Default profiles per stream
    #[serde(default, deserialize_with = "stream_keyed")]
    pub profiles: BTreeMap<String, Vec<String>>,
}

impl ModuleDefaults {
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            ..Default::default()
        }
    }

    pub fn with_stream(mut self, stream: impl Into<String>) -> Self {
        self.stream = Some(stream.into());
        self
    }

    pub fn with_profiles(mut self, stream: impl Into<String>, profiles: &[&str]) -> Self {
        self.profiles.insert(
            stream.into(),
            profiles.iter().map(|p| p.to_string()).collect(),
        );
        self
    }

    /// Default profiles for a stream, empty when none are defined
    pub fn profiles_for(&self, stream: &str) -> &[String] {
        self.profiles.get(stream).map(Vec::as_slice).unwrap_or(&[])
    }
}

fn optional_stream<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    string_or_number(deserializer).map(Some)
}

/// Stream names used as map keys, where `8:` is as common as `"8":`
#[derive(PartialEq, Eq, PartialOrd, Ord)]
struct StreamKey(String);

impl<'de> Deserialize<'de> for StreamKey {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        string_or_number(deserializer).map(StreamKey)
    }
}

fn stream_keyed<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, Vec<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let keyed = BTreeMap::<StreamKey, Vec<String>>::deserialize(deserializer)?;
    Ok(keyed.into_iter().map(|(key, profiles)| (key.0, profiles)).collect())
}

/// Read every defaults document from `*.yaml` files in a directory
///
/// A missing directory means no defaults. Files that fail to parse are
/// skipped with a warning.
pub fn read_module_defaults(dir: &Path) -> Result<Vec<ModuleDefaults>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No module defaults directory at {}", dir.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    let mut paths: Vec<_> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "yaml"))
        .collect();
    paths.sort();

    let mut defaults = Vec::new();
    for path in paths {
        let content = fs::read_to_string(&path)?;
        match parse_defaults_yaml(&content) {
            Ok(parsed) => defaults.extend(parsed),
            Err(e) => warn!("Ignoring module defaults {}: {}", path.display(), e),
        }
    }
    Ok(defaults)
}

/// Parse the `modulemd-defaults` documents of a YAML stream
pub fn parse_defaults_yaml(content: &str) -> Result<Vec<ModuleDefaults>> {
    parse_documents(content, DEFAULTS_DOCUMENT)
}

/// Chooses a stream for a module that has none enabled
pub trait DefaultStreamPolicy {
    fn default_stream(&self, module: &Module) -> Option<String>;

    /// Profiles to install when a spec names none
    fn default_profiles(&self, module: &Module, stream: &str) -> Vec<String> {
        module
            .defaults()
            .map(|d| d.profiles_for(stream).to_vec())
            .unwrap_or_default()
    }
}

/// Overrides, then module defaults, then a global fallback
#[derive(Debug, Clone, Default)]
pub struct ConfiguredDefaults {
    overrides: BTreeMap<String, String>,
    fallback: Option<String>,
}

impl ConfiguredDefaults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_override(mut self, module: impl Into<String>, stream: impl Into<String>) -> Self {
        self.overrides.insert(module.into(), stream.into());
        self
    }

    pub fn with_overrides(mut self, overrides: BTreeMap<String, String>) -> Self {
        self.overrides.extend(overrides);
        self
    }

    pub fn with_fallback(mut self, stream: Option<String>) -> Self {
        self.fallback = stream;
        self
    }
}

impl DefaultStreamPolicy for ConfiguredDefaults {
    fn default_stream(&self, module: &Module) -> Option<String> {
        self.overrides
            .get(module.name())
            .cloned()
            .or_else(|| module.defaults().and_then(|d| d.stream.clone()))
            .or_else(|| self.fallback.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULTS_YAML: &str = r#"
document: modulemd-defaults
version: 1
data:
  module: nodejs
  stream: 8
  profiles:
    "8": [default]
    "10": [default, development]
---
document: modulemd-defaults
version: 1
data:
  module: perl
"#;

    #[test]
    fn test_parse_defaults() {
        let defaults = parse_defaults_yaml(DEFAULTS_YAML).unwrap();
        assert_eq!(defaults.len(), 2);
        assert_eq!(defaults[0].module, "nodejs");
        assert_eq!(defaults[0].stream.as_deref(), Some("8"));
        assert_eq!(defaults[0].profiles_for("10"), ["default", "development"]);
        assert!(defaults[0].profiles_for("6").is_empty());
        assert_eq!(defaults[1].stream, None);
    }

    #[test]
    fn test_unquoted_stream_keys() {
        let yaml = r#"
document: modulemd-defaults
version: 1
data:
  module: python
  stream: 2.10
  profiles:
    8: [default]
    2.10: [client]
"#;
        let defaults = parse_defaults_yaml(yaml).unwrap();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[0].stream.as_deref(), Some("2.10"));
        assert_eq!(defaults[0].profiles_for("8"), ["default"]);
        assert_eq!(defaults[0].profiles_for("2.10"), ["client"]);
    }

    #[test]
    fn test_read_defaults_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("nodejs.yaml"), DEFAULTS_YAML).unwrap();
        fs::write(dir.path().join("broken.yaml"), "document: [").unwrap();

        let defaults = read_module_defaults(dir.path()).unwrap();
        assert_eq!(defaults.len(), 2);

        let missing = read_module_defaults(&dir.path().join("missing")).unwrap();
        assert!(missing.is_empty());
    }

    #[test]
    fn test_policy_precedence() {
        let mut module = Module::new("nodejs");
        module.set_defaults(ModuleDefaults::new("nodejs").with_stream("8"));

        let policy = ConfiguredDefaults::new().with_fallback(Some("f26".to_string()));
        assert_eq!(policy.default_stream(&module).as_deref(), Some("8"));

        let policy = policy.with_override("nodejs", "10");
        assert_eq!(policy.default_stream(&module).as_deref(), Some("10"));

        let bare = Module::new("perl");
        let policy = ConfiguredDefaults::new().with_fallback(Some("f26".to_string()));
        assert_eq!(policy.default_stream(&bare).as_deref(), Some("f26"));
        assert_eq!(ConfiguredDefaults::new().default_stream(&bare), None);
    }
}
