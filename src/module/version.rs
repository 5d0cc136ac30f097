// src/module/version.rs

//! A single release of a module stream

use super::metadata::ModuleMetadata;
use crate::error::{Error, Result};
use crate::version::Nevra;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use tracing::warn;

/// One metadata-backed version of a module, immutable once built
///
/// Versions only order against versions of the same `name-stream`;
/// [`PartialOrd`] yields `None` across streams.
#[derive(Debug, Clone)]
pub struct ModuleVersion {
    metadata: ModuleMetadata,
    repo_id: String,
}

impl ModuleVersion {
    pub fn new(metadata: ModuleMetadata, repo_id: impl Into<String>) -> Self {
        Self {
            metadata,
            repo_id: repo_id.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn stream(&self) -> &str {
        &self.metadata.stream
    }

    pub fn version(&self) -> u64 {
        self.metadata.version
    }

    /// `name-stream`
    pub fn full_stream(&self) -> String {
        format!("{}-{}", self.name(), self.stream())
    }

    /// `name-stream-version`
    pub fn full_version(&self) -> String {
        format!("{}-{}-{}", self.name(), self.stream(), self.version())
    }

    pub fn summary(&self) -> &str {
        &self.metadata.summary
    }

    pub fn metadata(&self) -> &ModuleMetadata {
        &self.metadata
    }

    /// Repository this version was loaded from
    pub fn repo_id(&self) -> &str {
        &self.repo_id
    }

    /// Profile names, sorted
    pub fn profiles(&self) -> Vec<&str> {
        self.metadata.profiles.keys().map(String::as_str).collect()
    }

    pub fn has_profile(&self, profile: &str) -> bool {
        self.metadata.profiles.contains_key(profile)
    }

    /// Package names a profile asks for
    pub fn rpms(&self, profile: &str) -> Option<&[String]> {
        self.metadata
            .profiles
            .get(profile)
            .map(|p| p.rpms.as_slice())
    }

    /// Module artifacts as NEVRA strings, zero epochs removed
    pub fn nevra(&self) -> Vec<String> {
        self.metadata
            .artifacts
            .rpms
            .iter()
            .map(|a| a.replace("-0:", "-"))
            .collect()
    }

    /// Concrete `name-evr` strings for the packages of a profile
    ///
    /// Only artifacts the module actually ships are returned; profile
    /// entries without a matching artifact are silently absent.
    pub fn profile_nevra(&self, profile: &str) -> Result<BTreeSet<String>> {
        let rpms = self.rpms(profile).ok_or_else(|| self.no_profile(profile))?;

        let mut result = BTreeSet::new();
        for artifact in &self.metadata.artifacts.rpms {
            let nevra = match Nevra::parse(artifact) {
                Ok(n) => n,
                Err(e) => {
                    warn!("Skipping artifact of {}: {}", self.full_version(), e);
                    continue;
                }
            };
            if rpms.iter().any(|r| *r == nevra.name) {
                result.insert(nevra.nevr());
            }
        }
        Ok(result)
    }

    pub(crate) fn no_profile(&self, profile: &str) -> Error {
        Error::NoProfile {
            profile: profile.to_string(),
            possible: self.profiles().join(", "),
        }
    }
}

impl PartialEq for ModuleVersion {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
            && self.stream() == other.stream()
            && self.version() == other.version()
    }
}

impl PartialOrd for ModuleVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.name() != other.name() || self.stream() != other.stream() {
            return None;
        }
        Some(self.version().cmp(&other.version()))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::module::metadata::{ModuleArtifacts, ModuleProfile};
    use std::collections::BTreeMap;

    /// Build a module version with the given profiles and artifacts
    pub(crate) fn module_version(
        name: &str,
        stream: &str,
        version: u64,
        profiles: &[(&str, &[&str])],
        artifacts: &[&str],
    ) -> ModuleVersion {
        let profiles: BTreeMap<String, ModuleProfile> = profiles
            .iter()
            .map(|(p, rpms)| {
                (
                    p.to_string(),
                    ModuleProfile {
                        description: None,
                        rpms: rpms.iter().map(|r| r.to_string()).collect(),
                    },
                )
            })
            .collect();
        let metadata = ModuleMetadata {
            name: name.to_string(),
            stream: stream.to_string(),
            version,
            summary: format!("{} module", name),
            description: String::new(),
            profiles,
            artifacts: ModuleArtifacts {
                rpms: artifacts.iter().map(|a| a.to_string()).collect(),
            },
        };
        ModuleVersion::new(metadata, "test-repo")
    }

    #[test]
    fn test_profile_nevra_intersects_artifacts() {
        let v = module_version(
            "foo",
            "1.0",
            3,
            &[("web", &["bar", "baz", "missing"])],
            &["bar-1.0-1", "baz-0:2.0-1.x86_64", "qux-1.0-1"],
        );
        let nevras = v.profile_nevra("web").unwrap();
        let expected: BTreeSet<String> =
            ["bar-1.0-1", "baz-2.0-1"].iter().map(|s| s.to_string()).collect();
        assert_eq!(nevras, expected);
    }

    #[test]
    fn test_profile_nevra_unknown_profile() {
        let v = module_version("foo", "1.0", 3, &[("web", &["bar"]), ("cli", &[])], &[]);
        let err = v.profile_nevra("server").unwrap_err();
        assert_eq!(
            err.to_string(),
            "No such profile: server. Possible profiles: cli, web"
        );
    }

    #[test]
    fn test_ordering_within_stream_only() {
        let a = module_version("foo", "1.0", 1, &[], &[]);
        let b = module_version("foo", "1.0", 2, &[], &[]);
        let c = module_version("foo", "2.0", 5, &[], &[]);
        assert!(a < b);
        assert_eq!(a.partial_cmp(&c), None);
    }

    #[test]
    fn test_names() {
        let v = module_version("httpd", "2.4", 7, &[], &["httpd-0:2.4.25-8.x86_64"]);
        assert_eq!(v.full_stream(), "httpd-2.4");
        assert_eq!(v.full_version(), "httpd-2.4-7");
        assert_eq!(v.nevra(), vec!["httpd-2.4.25-8.x86_64"]);
    }
}
