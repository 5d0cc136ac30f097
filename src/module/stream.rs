// src/module/stream.rs

//! Versions of one module stream

use super::version::ModuleVersion;
use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// All known versions of `name-stream`, keyed by version number
///
/// The name and stream are fixed by the first version added.
#[derive(Debug, Clone)]
pub struct ModuleStream {
    name: String,
    stream: String,
    versions: BTreeMap<u64, ModuleVersion>,
}

impl ModuleStream {
    pub fn new(first: ModuleVersion) -> Self {
        let mut versions = BTreeMap::new();
        let name = first.name().to_string();
        let stream = first.stream().to_string();
        versions.insert(first.version(), first);
        Self {
            name,
            stream,
            versions,
        }
    }

    /// Add a version; it must belong to this stream
    ///
    /// A version already present is replaced.
    pub fn add(&mut self, version: ModuleVersion) -> Result<()> {
        if version.name() != self.name || version.stream() != self.stream {
            return Err(Error::StreamMismatch {
                expected: format!("{}-{}", self.name, self.stream),
                found: version.full_version(),
            });
        }
        self.versions.insert(version.version(), version);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stream(&self) -> &str {
        &self.stream
    }

    pub fn get(&self, version: u64) -> Option<&ModuleVersion> {
        self.versions.get(&version)
    }

    /// Highest version of the stream
    pub fn latest(&self) -> Option<&ModuleVersion> {
        self.versions.values().next_back()
    }

    /// Versions in ascending order
    pub fn versions(&self) -> impl Iterator<Item = &ModuleVersion> {
        self.versions.values()
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::version::tests::module_version;

    #[test]
    fn test_latest_ignores_insertion_order() {
        let mut stream = ModuleStream::new(module_version("httpd", "2.4", 5, &[], &[]));
        stream.add(module_version("httpd", "2.4", 9, &[], &[])).unwrap();
        stream.add(module_version("httpd", "2.4", 1, &[], &[])).unwrap();

        assert_eq!(stream.len(), 3);
        assert_eq!(stream.latest().unwrap().version(), 9);
        assert_eq!(stream.get(1).unwrap().version(), 1);
        assert!(stream.get(2).is_none());
    }

    #[test]
    fn test_add_rejects_other_stream() {
        let mut stream = ModuleStream::new(module_version("httpd", "2.4", 1, &[], &[]));
        let err = stream
            .add(module_version("httpd", "2.2", 1, &[], &[]))
            .unwrap_err();
        assert!(matches!(err, Error::StreamMismatch { .. }));

        let err = stream
            .add(module_version("nginx", "2.4", 1, &[], &[]))
            .unwrap_err();
        assert!(matches!(err, Error::StreamMismatch { .. }));
        assert_eq!(stream.len(), 1);
    }
}
