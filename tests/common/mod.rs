// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use conary_modules::config::{DefaultStreamSettings, ModuleSettings, PathSettings};
use conary_modules::module::RepoHandle;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Two modules: foo with streams 1.0 and 2.0, httpd with 2.4 and 2.2
pub const MODULES_YAML: &str = r#"
document: modulemd
version: 1
data:
  name: foo
  stream: "1.0"
  version: 3
  summary: Foo web stack
  profiles:
    web:
      rpms: [bar, baz]
    cli:
      rpms: [qux]
  artifacts:
    rpms:
      - bar-1.0-1
      - baz-0:2.0-1.x86_64
      - qux-1:0.9-2.noarch
---
document: modulemd
version: 1
data:
  name: foo
  stream: "2.0"
  version: 1
  summary: Foo web stack
  profiles:
    web:
      rpms: [bar]
  artifacts:
    rpms:
      - bar-2.0-1
---
document: modulemd
version: 1
data:
  name: httpd
  stream: 2.4
  version: 1
  summary: Apache HTTP Server
---
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
  artifacts:
    rpms:
      - httpd-0:2.4.29-1.x86_64
---
document: modulemd
version: 1
data:
  name: httpd
  stream: 2.2
  version: 1
  summary: Apache HTTP Server
"#;

/// Distribution defaults: httpd defaults to 2.4 with its default profile
pub const DEFAULTS_YAML: &str = r#"
document: modulemd-defaults
version: 1
data:
  module: httpd
  stream: 2.4
  profiles:
    "2.4": [default]
"#;

/// Write a repository cache directory holding `modules_yaml`
pub fn write_repo(root: &Path, id: &str, modules_yaml: &str) -> RepoHandle {
    let cachedir = root.join("cache").join(id);
    let repodata = cachedir.join("repodata");
    fs::create_dir_all(&repodata).unwrap();
    fs::write(repodata.join("abc123-modules.yaml"), modules_yaml).unwrap();
    RepoHandle::new(id, cachedir)
}

/// Settings rooted in a fresh temp dir, with one repository and defaults
///
/// Returns (TempDir, settings) - keep the TempDir alive to prevent cleanup.
pub fn setup_settings() -> (TempDir, ModuleSettings) {
    let temp_dir = tempfile::tempdir().unwrap();
    let repo = write_repo(temp_dir.path(), "modular", MODULES_YAML);

    let settings = ModuleSettings {
        paths: PathSettings {
            install_root: temp_dir.path().join("sysroot"),
            ..PathSettings::default()
        },
        defaults: DefaultStreamSettings::default(),
        repos: vec![repo],
    };

    let defaults_dir = settings.defaults_dir();
    fs::create_dir_all(&defaults_dir).unwrap();
    fs::write(defaults_dir.join("httpd.yaml"), DEFAULTS_YAML).unwrap();

    (temp_dir, settings)
}
