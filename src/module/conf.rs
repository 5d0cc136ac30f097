// src/module/conf.rs

//! Persisted module configuration
//!
//! Each module's enable/lock/install state lives in its own
//! `<name>.module` file under the modules directory. This is the only
//! module state that survives between runs.

use crate::error::{Error, Result};
use nix::sys::stat::{umask, Mode};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, warn};

/// File suffix of persisted module configs
pub const MODULE_CONF_SUFFIX: &str = "module";

/// Persisted state for one module
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleConf {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub profiles: BTreeSet<String>,
}

impl ModuleConf {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// File name this config is stored under
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name, MODULE_CONF_SUFFIX)
    }
}

/// Where module configs are read from and written to
pub trait ModuleConfStore {
    /// Every stored config
    fn read_all(&self) -> Result<Vec<ModuleConf>>;

    /// Store one config, replacing any previous one for the module
    fn write(&self, conf: &ModuleConf) -> Result<()>;
}

/// Module configs stored as TOML files in a directory
#[derive(Debug, Clone)]
pub struct ModuleConfDir {
    dir: PathBuf,
}

impl ModuleConfDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The modules directory below an install root
    ///
    /// `modules_dir` is taken relative to `install_root` even when absolute.
    pub fn under_root(install_root: &Path, modules_dir: &Path) -> Self {
        let relative = modules_dir.strip_prefix("/").unwrap_or(modules_dir);
        Self::new(install_root.join(relative))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the directory readable by group and other regardless of umask
    fn ensure_dir(&self) -> Result<()> {
        if self.dir.is_dir() {
            return Ok(());
        }
        let old = umask(Mode::from_bits_truncate(0o022));
        let created = fs::create_dir_all(&self.dir);
        umask(old);
        created?;
        debug!("Created modules directory {}", self.dir.display());
        Ok(())
    }
}

impl ModuleConfStore for ModuleConfDir {
    fn read_all(&self) -> Result<Vec<ModuleConf>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == MODULE_CONF_SUFFIX))
            .collect();
        paths.sort();

        let mut confs = Vec::with_capacity(paths.len());
        for path in paths {
            let content = fs::read_to_string(&path)?;
            match toml::from_str::<ModuleConf>(&content) {
                Ok(conf) => confs.push(conf),
                Err(source) => {
                    let err = Error::ConfParse {
                        path: path.display().to_string(),
                        source,
                    };
                    warn!("Ignoring module config: {}", err);
                }
            }
        }
        Ok(confs)
    }

    fn write(&self, conf: &ModuleConf) -> Result<()> {
        self.ensure_dir()?;
        let path = self.dir.join(conf.file_name());
        fs::write(&path, toml::to_string(conf)?)?;
        debug!("Wrote module config {}", path.display());
        Ok(())
    }
}

/// In-memory config store; clones share the same contents
///
/// Counts writes so callers can tell whether anything was persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryConfStore {
    confs: Rc<RefCell<BTreeMap<String, ModuleConf>>>,
    writes: Rc<Cell<usize>>,
}

impl MemoryConfStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with configs, without counting writes
    pub fn with_confs(confs: impl IntoIterator<Item = ModuleConf>) -> Self {
        let store = Self::new();
        store
            .confs
            .borrow_mut()
            .extend(confs.into_iter().map(|c| (c.name.clone(), c)));
        store
    }

    pub fn get(&self, name: &str) -> Option<ModuleConf> {
        self.confs.borrow().get(name).cloned()
    }

    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl ModuleConfStore for MemoryConfStore {
    fn read_all(&self) -> Result<Vec<ModuleConf>> {
        Ok(self.confs.borrow().values().cloned().collect())
    }

    fn write(&self, conf: &ModuleConf) -> Result<()> {
        self.confs
            .borrow_mut()
            .insert(conf.name.clone(), conf.clone());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn sample_conf() -> ModuleConf {
        ModuleConf {
            name: "httpd".to_string(),
            stream: Some("2.4".to_string()),
            version: Some(2),
            enabled: true,
            locked: false,
            profiles: ["default".to_string()].into_iter().collect(),
        }
    }

    #[test]
    fn test_dir_store_writes_module_file() {
        let root = tempfile::tempdir().unwrap();
        let store = ModuleConfDir::under_root(root.path(), Path::new("/etc/dnf/modules.d"));
        assert!(!store.dir().exists());

        store.write(&sample_conf()).unwrap();

        let path = root.path().join("etc/dnf/modules.d/httpd.module");
        assert!(path.is_file());
        let mode = fs::metadata(store.dir()).unwrap().permissions().mode();
        assert_eq!(mode & 0o055, 0o055);

        let confs = store.read_all().unwrap();
        assert_eq!(confs, vec![sample_conf()]);
    }

    #[test]
    fn test_dir_store_missing_dir_is_empty() {
        let root = tempfile::tempdir().unwrap();
        let store = ModuleConfDir::new(root.path().join("nope"));
        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_dir_store_skips_invalid_files() {
        let root = tempfile::tempdir().unwrap();
        let store = ModuleConfDir::new(root.path());
        store.write(&sample_conf()).unwrap();
        fs::write(root.path().join("broken.module"), "name = [").unwrap();
        fs::write(root.path().join("notes.txt"), "ignored").unwrap();

        let confs = store.read_all().unwrap();
        assert_eq!(confs.len(), 1);
        assert_eq!(confs[0].name, "httpd");
    }

    #[test]
    fn test_conf_defaults_when_fields_missing() {
        let conf: ModuleConf = toml::from_str("name = \"nodejs\"\n").unwrap();
        assert_eq!(conf, ModuleConf::new("nodejs"));
    }

    #[test]
    fn test_memory_store_shares_state() {
        let store = MemoryConfStore::new();
        let handle = store.clone();
        store.write(&sample_conf()).unwrap();
        assert_eq!(handle.write_count(), 1);
        assert_eq!(handle.get("httpd"), Some(sample_conf()));
    }
}
