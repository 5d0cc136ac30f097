// src/module/metadata.rs

//! Module metadata records and the repodata loader
//!
//! Repositories ship module metadata as a stream of YAML documents in a
//! `*modules.yaml[.gz]` file under `repodata/`. Only `modulemd` documents
//! become module versions; defaults documents are read separately.

use crate::error::{Error, Result};
use flate2::read::GzDecoder;
use serde::de::{self, DeserializeOwned, DeserializeSeed, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::{self, File};
use std::io::Read;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Document type tag for module metadata
pub const MODULEMD_DOCUMENT: &str = "modulemd";

/// A repository carrying module metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoHandle {
    /// Repository identifier, used as the origin hint for installs
    pub id: String,
    /// Local metadata cache directory (contains `repodata/`)
    pub cachedir: PathBuf,
}

impl RepoHandle {
    pub fn new(id: impl Into<String>, cachedir: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            cachedir: cachedir.into(),
        }
    }
}

/// Metadata for one module version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleMetadata {
    pub name: String,
    #[serde(deserialize_with = "string_or_number")]
    pub stream: String,
    pub version: u64,
    #[serde(default)]
    pub summary: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub profiles: BTreeMap<String, ModuleProfile>,
    #[serde(default)]
    pub artifacts: ModuleArtifacts,
}

/// A named package subset of a module
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub rpms: Vec<String>,
}

/// Packages built for a module version, as NEVRA strings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleArtifacts {
    #[serde(default)]
    pub rpms: Vec<String>,
}

/// Streams such as `2.4` are frequently written unquoted
///
/// The scalar is taken as written, so `2.10` stays `2.10`. Numbers only
/// reach the visitor from already-parsed values.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_str(StringOrNumber)
}

struct StringOrNumber;

impl Visitor<'_> for StringOrNumber {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string or number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<String, E> {
        Ok(v)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<String, E> {
        Ok(v.to_string())
    }
}

/// Reads the `data` of one YAML document when its `document` tag is `kind`
///
/// The payload is deserialized straight from the YAML events so scalars keep
/// their source text. A `data` key that precedes `document` has to be
/// buffered as a [`serde_yaml::Value`] first.
struct DocumentSeed<'k, T> {
    kind: &'k str,
    marker: PhantomData<T>,
}

impl<'k, T> DocumentSeed<'k, T> {
    fn new(kind: &'k str) -> Self {
        Self {
            kind,
            marker: PhantomData,
        }
    }
}

impl<'de, T: DeserializeOwned> DeserializeSeed<'de> for DocumentSeed<'_, T> {
    type Value = Option<T>;

    fn deserialize<D>(self, deserializer: D) -> std::result::Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(self)
    }
}

impl<'de, T: DeserializeOwned> Visitor<'de> for DocumentSeed<'_, T> {
    type Value = Option<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a document with `document` and `data` keys")
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<Option<T>, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut document: Option<String> = None;
        let mut data: Option<T> = None;
        let mut buffered: Option<serde_yaml::Value> = None;

        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "document" => document = Some(map.next_value()?),
                "data" => match document.as_deref() {
                    Some(kind) if kind == self.kind => data = Some(map.next_value()?),
                    Some(_) => {
                        map.next_value::<IgnoredAny>()?;
                    }
                    None => buffered = Some(map.next_value()?),
                },
                _ => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }

        let document = document.ok_or_else(|| de::Error::missing_field("document"))?;
        if document != self.kind {
            debug!("Skipping {} document while reading {}", document, self.kind);
            return Ok(None);
        }

        if let Some(value) = buffered {
            // Round-trip through text so string fields still see plain scalars
            let text = serde_yaml::to_string(&value).map_err(de::Error::custom)?;
            data = Some(serde_yaml::from_str(&text).map_err(de::Error::custom)?);
        }
        data.map(Some).ok_or_else(|| de::Error::missing_field("data"))
    }
}

/// Deserialize the `data` of every `kind` document in a YAML stream
pub(crate) fn parse_documents<T: DeserializeOwned>(content: &str, kind: &str) -> Result<Vec<T>> {
    let mut parsed = Vec::new();
    for document in serde_yaml::Deserializer::from_str(content) {
        if let Some(data) = DocumentSeed::<T>::new(kind).deserialize(document)? {
            parsed.push(data);
        }
    }
    Ok(parsed)
}

/// Parse every `modulemd` document in a YAML stream
pub fn parse_modules_yaml(content: &str) -> Result<Vec<ModuleMetadata>> {
    parse_documents(content, MODULEMD_DOCUMENT)
}

/// Loads module metadata from a repository's cache directory
pub struct ModuleMetadataLoader<'a> {
    repo: Option<&'a RepoHandle>,
}

impl<'a> ModuleMetadataLoader<'a> {
    pub fn new(repo: Option<&'a RepoHandle>) -> Self {
        Self { repo }
    }

    /// Read and parse the repository's modules file
    ///
    /// Fails with [`Error::LoadCache`] when there is no repository and with
    /// [`Error::MissingMetadata`] when `repodata/` has no modules file.
    pub fn load(&self) -> Result<Vec<ModuleMetadata>> {
        let repo = self
            .repo
            .ok_or_else(|| Error::LoadCache("<no repository>".to_string()))?;

        let path = find_modules_file(&repo.cachedir)?;
        debug!("Loading module metadata for {} from {}", repo.id, path.display());

        let mut content = String::new();
        let file = File::open(&path)?;
        if path.extension().is_some_and(|ext| ext == "gz") {
            GzDecoder::new(file).read_to_string(&mut content)?;
        } else {
            let mut file = file;
            file.read_to_string(&mut content)?;
        }

        parse_modules_yaml(&content)
    }
}

fn find_modules_file(cachedir: &Path) -> Result<PathBuf> {
    let repodata = cachedir.join("repodata");
    let entries = fs::read_dir(&repodata)
        .map_err(|_| Error::LoadCache(cachedir.display().to_string()))?;

    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.contains("modules"))
        })
        .collect();
    candidates.sort();

    candidates
        .into_iter()
        .next()
        .ok_or_else(|| Error::MissingMetadata(cachedir.display().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    const HTTPD_YAML: &str = r#"
document: modulemd
version: 1
data:
  name: httpd
  stream: 2.4
  version: 2
  summary: Apache HTTP Server
  profiles:
    default:
      rpms: [httpd]
    devel:
      rpms: [httpd, httpd-devel]
  artifacts:
    rpms:
      - httpd-0:2.4.25-8.x86_64
      - httpd-devel-0:2.4.25-8.x86_64
---
document: modulemd-defaults
version: 1
data:
  module: httpd
  stream: "2.4"
"#;

    #[test]
    fn test_parse_modules_yaml_skips_other_documents() {
        let modules = parse_modules_yaml(HTTPD_YAML).unwrap();
        assert_eq!(modules.len(), 1);
        let httpd = &modules[0];
        assert_eq!(httpd.name, "httpd");
        assert_eq!(httpd.stream, "2.4");
        assert_eq!(httpd.version, 2);
        assert_eq!(httpd.profiles["devel"].rpms, vec!["httpd", "httpd-devel"]);
        assert_eq!(httpd.artifacts.rpms.len(), 2);
    }

    #[test]
    fn test_stream_keeps_trailing_zero() {
        let yaml = r#"
document: modulemd
version: 2
data:
  name: python
  stream: 2.10
  version: 1
---
document: modulemd
data:
  name: nodejs
  stream: 10
  version: 3
"#;
        let modules = parse_modules_yaml(yaml).unwrap();
        assert_eq!(modules[0].stream, "2.10");
        assert_eq!(modules[1].stream, "10");
    }

    #[test]
    fn test_data_before_document_tag() {
        let yaml = r#"
data:
  name: perl
  stream: 5.26
  version: 1
document: modulemd
---
data:
  module: perl
document: modulemd-defaults
"#;
        let modules = parse_modules_yaml(yaml).unwrap();
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].name, "perl");
        assert_eq!(modules[0].stream, "5.26");
    }

    #[test]
    fn test_document_without_tag_is_an_error() {
        let err = parse_modules_yaml("data:\n  name: perl\n").unwrap_err();
        assert!(matches!(err, Error::Metadata(_)));
    }

    #[test]
    fn test_loader_without_repo() {
        let err = ModuleMetadataLoader::new(None).load().unwrap_err();
        assert!(matches!(err, Error::LoadCache(_)));
    }

    #[test]
    fn test_loader_missing_modules_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("repodata")).unwrap();
        fs::write(dir.path().join("repodata/primary.xml"), "").unwrap();

        let repo = RepoHandle::new("fedora", dir.path());
        let err = ModuleMetadataLoader::new(Some(&repo)).load().unwrap_err();
        assert!(matches!(err, Error::MissingMetadata(_)));
    }

    #[test]
    fn test_loader_reads_gzip() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("repodata")).unwrap();
        let file = File::create(dir.path().join("repodata/abc-modules.yaml.gz")).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(HTTPD_YAML.as_bytes()).unwrap();
        encoder.finish().unwrap();

        let repo = RepoHandle::new("fedora", dir.path());
        let modules = ModuleMetadataLoader::new(Some(&repo)).load().unwrap();
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].name, "httpd");
    }
}
