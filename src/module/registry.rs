// src/module/registry.rs

//! The module registry: resolution and state-changing operations
//!
//! # Resolution
//!
//! [`ModuleRegistry::find_version`] picks a concrete version for a
//! name with optional stream and version:
//!
//! 1. Unknown name: not found.
//! 2. No stream given: the enabled stream, else the default stream policy.
//! 3. The module must have that stream.
//! 4. A lock wins over everything, including an explicit version.
//! 5. Otherwise the requested version, else the latest one.
//!
//! [`ModuleRegistry::find_by_identifier`] tries each reading of a user spec
//! in turn and returns the first that resolves. When none does, the miss of
//! the most specific reading that names a known module is reported.

use super::conf::{ModuleConf, ModuleConfStore};
use super::defaults::{ConfiguredDefaults, DefaultStreamPolicy, ModuleDefaults};
use super::goal::PackageGoal;
use super::metadata::{ModuleMetadataLoader, RepoHandle};
use super::nsvap::{ModuleSubject, Nsvap};
use super::report::{AssumeNo, Confirm, Reporter, TracingReporter};
use super::state::{EnableOutcome, Module};
use super::transaction::{ModuleTransaction, TransactionAction};
use super::version::ModuleVersion;
use crate::error::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, error, info};

/// Why a lookup found nothing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Missing {
    /// No module of that name
    Module(String),
    /// No stream given, none enabled and no default
    ActiveStream(String),
    /// The module has no such stream
    Stream { module: String, stream: String },
    /// The stream has no such version
    Version {
        module: String,
        stream: String,
        version: u64,
    },
}

impl From<Missing> for Error {
    fn from(missing: Missing) -> Self {
        match missing {
            Missing::Module(name) => Error::NoModule(name),
            Missing::ActiveStream(name) => Error::NoActiveStream(name),
            Missing::Stream { module, stream } => Error::NoStream { module, stream },
            Missing::Version {
                module,
                stream,
                version,
            } => Error::NoVersion {
                module,
                stream,
                version,
            },
        }
    }
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Error::from(self.clone()))
    }
}

/// Per-spec outcome of a batch install or upgrade
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Specs whose packages were handed to the goal
    pub completed: Vec<String>,
    /// Specs that were skipped, with the reason
    pub failed: Vec<(String, Error)>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Everything needed to hand one module operation to the goal
#[derive(Debug)]
struct ModulePlan {
    name: String,
    stream: String,
    version: u64,
    repo_id: String,
    profiles: Vec<String>,
    packages: BTreeSet<String>,
}

/// All known modules plus the collaborators operations need
pub struct ModuleRegistry {
    modules: BTreeMap<String, Module>,
    store: Box<dyn ModuleConfStore>,
    default_policy: Box<dyn DefaultStreamPolicy>,
    reporter: Box<dyn Reporter>,
    confirm: Box<dyn Confirm>,
    transaction: ModuleTransaction,
}

impl ModuleRegistry {
    /// An empty registry persisting to `store`
    ///
    /// Messages go to `tracing`, stream switches are declined and there is
    /// no default stream until configured otherwise.
    pub fn new(store: impl ModuleConfStore + 'static) -> Self {
        Self {
            modules: BTreeMap::new(),
            store: Box::new(store),
            default_policy: Box::new(ConfiguredDefaults::new()),
            reporter: Box::new(TracingReporter),
            confirm: Box::new(AssumeNo),
            transaction: ModuleTransaction::new(),
        }
    }

    pub fn with_default_policy(mut self, policy: impl DefaultStreamPolicy + 'static) -> Self {
        self.default_policy = Box::new(policy);
        self
    }

    pub fn with_reporter(mut self, reporter: impl Reporter + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    pub fn with_confirm(mut self, confirm: impl Confirm + 'static) -> Self {
        self.confirm = Box::new(confirm);
        self
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Add one module version
    pub fn add(&mut self, version: ModuleVersion) -> Result<()> {
        self.modules
            .entry(version.name().to_string())
            .or_insert_with(|| Module::new(version.name()))
            .add(version)
    }

    /// Load every module version a repository ships
    pub fn load_modules(&mut self, repo: &RepoHandle) -> Result<usize> {
        let metadata = ModuleMetadataLoader::new(Some(repo)).load()?;
        let count = metadata.len();
        for record in metadata {
            self.add(ModuleVersion::new(record, repo.id.clone()))?;
        }
        debug!("Loaded {} module versions from {}", count, repo.id);
        Ok(count)
    }

    /// Attach persisted configs, creating modules that have no metadata
    pub fn read_all_modules(&mut self) -> Result<()> {
        for conf in self.store.read_all()? {
            self.modules
                .entry(conf.name.clone())
                .or_insert_with(|| Module::new(conf.name.clone()))
                .set_conf(conf);
        }
        Ok(())
    }

    /// Attach distribution defaults to known modules
    pub fn read_all_module_defaults(&mut self, defaults: impl IntoIterator<Item = ModuleDefaults>) {
        for entry in defaults {
            match self.modules.get_mut(&entry.module) {
                Some(module) => module.set_defaults(entry),
                None => debug!("No module named {}, skipping.", entry.module),
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Module> {
        self.modules.get(name)
    }

    /// Modules sorted by name
    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.values()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Select the version that `name`, `stream` and `version` refer to
    ///
    /// `arch` is accepted but does not filter yet.
    pub fn find_version(
        &self,
        name: &str,
        stream: Option<&str>,
        version: Option<u64>,
        _arch: Option<&str>,
    ) -> std::result::Result<&ModuleVersion, Missing> {
        let module = self
            .modules
            .get(name)
            .ok_or_else(|| Missing::Module(name.to_string()))?;

        let stream_name = match stream {
            Some(s) => s.to_string(),
            None => match module.enabled_stream() {
                Some(s) => s.to_string(),
                None => self
                    .default_policy
                    .default_stream(module)
                    .ok_or_else(|| Missing::ActiveStream(name.to_string()))?,
            },
        };

        let module_stream = module.stream(&stream_name).ok_or_else(|| Missing::Stream {
            module: name.to_string(),
            stream: stream_name.clone(),
        })?;

        let missing_version = |v: u64| Missing::Version {
            module: name.to_string(),
            stream: stream_name.clone(),
            version: v,
        };

        if let Some(locked) = module.locked_version() {
            return module_stream.get(locked).ok_or_else(|| missing_version(locked));
        }

        match version {
            Some(v) => module_stream.get(v).ok_or_else(|| missing_version(v)),
            None => module_stream.latest().ok_or_else(|| Missing::Stream {
                module: name.to_string(),
                stream: stream_name.clone(),
            }),
        }
    }

    /// Resolve a user spec, trying its most specific readings first
    ///
    /// `foo-3.0` misses with "no such stream" when `foo` exists, and with
    /// `Missing::Module(spec)` when no reading names a known module.
    pub fn find_by_identifier(
        &self,
        spec: &str,
    ) -> std::result::Result<(&ModuleVersion, Nsvap), Missing> {
        let mut closest = None;
        for nsvap in ModuleSubject::new(spec).nsvap_possibilities() {
            match self.find_version(
                &nsvap.name,
                nsvap.stream.as_deref(),
                nsvap.version,
                nsvap.arch.as_deref(),
            ) {
                Ok(found) => return Ok((found, nsvap)),
                Err(missing) => {
                    debug!("{} does not match: {}", nsvap, missing);
                    if closest.is_none() && !matches!(missing, Missing::Module(_)) {
                        closest = Some(missing);
                    }
                }
            }
        }
        Err(closest.unwrap_or_else(|| Missing::Module(spec.to_string())))
    }

    /// Metadata of the version a spec resolves to, as YAML
    pub fn full_description(&self, spec: &str) -> Result<String> {
        let (found, _) = self.find_by_identifier(spec)?;
        let yaml = serde_yaml::to_string(found.metadata())?;
        Ok(yaml.trim_end().to_string())
    }

    // =========================================================================
    // Enable / disable / lock
    // =========================================================================

    /// Enable the stream a spec resolves to
    pub fn enable(&mut self, spec: &str, assume_yes: bool, assume_no: bool) -> Result<EnableOutcome> {
        let (name, stream) = {
            let (found, _) = self.find_by_identifier(spec)?;
            (found.name().to_string(), found.stream().to_string())
        };
        self.enable_stream(&name, &stream, assume_yes, assume_no)
    }

    fn enable_stream(
        &mut self,
        name: &str,
        stream: &str,
        assume_yes: bool,
        assume_no: bool,
    ) -> Result<EnableOutcome> {
        let module = self
            .modules
            .get_mut(name)
            .ok_or_else(|| Error::NoModule(name.to_string()))?;

        let outcome = module.enable(
            stream,
            assume_yes,
            assume_no,
            self.confirm.as_ref(),
            self.reporter.as_ref(),
        )?;
        if outcome == EnableOutcome::Enabled {
            persist(self.store.as_ref(), module)?;
        }
        Ok(outcome)
    }

    /// Disable a module, keeping its history
    ///
    /// Falls back to a plain name lookup so modules whose metadata is gone
    /// can still be disabled.
    pub fn disable(&mut self, spec: &str) -> Result<()> {
        let name = self.module_name_for(spec)?;
        let module = self
            .modules
            .get_mut(&name)
            .ok_or_else(|| Error::NoModule(spec.to_string()))?;
        module.disable();
        persist(self.store.as_ref(), module)
    }

    /// Pin an enabled module to its installed version
    ///
    /// When nothing is installed yet the resolved version is pinned.
    pub fn lock(&mut self, spec: &str) -> Result<u64> {
        let (name, resolved) = {
            let (found, _) = self.find_by_identifier(spec)?;
            (found.name().to_string(), found.version())
        };
        let module = self
            .modules
            .get_mut(&name)
            .ok_or_else(|| Error::NoModule(name.clone()))?;
        if !module.is_enabled() {
            return Err(Error::NotEnabled(name));
        }

        let conf = module.conf_mut();
        let version = *conf.version.get_or_insert(resolved);
        conf.locked = true;
        persist(self.store.as_ref(), module)?;
        self.reporter
            .info(&format!("Module {} locked to version {}", name, version));
        Ok(version)
    }

    /// Remove a lock, keeping the recorded version
    pub fn unlock(&mut self, spec: &str) -> Result<()> {
        let name = self.module_name_for(spec)?;
        let module = self
            .modules
            .get_mut(&name)
            .ok_or_else(|| Error::NoModule(spec.to_string()))?;
        module.conf_mut().locked = false;
        persist(self.store.as_ref(), module)
    }

    fn module_name_for(&self, spec: &str) -> Result<String> {
        match self.find_by_identifier(spec) {
            Ok((found, _)) => Ok(found.name().to_string()),
            Err(_) if self.modules.contains_key(spec) => Ok(spec.to_string()),
            Err(missing) => Err(missing.into()),
        }
    }

    // =========================================================================
    // Install / upgrade
    // =========================================================================

    /// Request the packages of each spec's profile
    ///
    /// With `autoenable`, a module whose resolved stream is not the enabled
    /// one gets that stream enabled first. Without it, a spec resolving to a
    /// stream other than the enabled one is skipped. Specs that fail to
    /// resolve or validate are reported and skipped; a failing goal aborts
    /// the batch. Installed profiles are persisted only at the transaction
    /// checkpoint. Once a checkpoint has committed, the next tracked module
    /// starts a fresh transaction.
    pub fn install<S: AsRef<str>>(
        &mut self,
        specs: &[S],
        autoenable: bool,
        goal: &mut dyn PackageGoal,
    ) -> Result<BatchReport> {
        let mut report = BatchReport::default();

        for spec in specs.iter().map(AsRef::as_ref) {
            let plan = match self.plan_install(spec) {
                Ok(plan) => plan,
                Err(e) => {
                    self.skip(&mut report, spec, e);
                    continue;
                }
            };

            let checked = if autoenable {
                self.autoenable(&plan)
            } else {
                self.check_enabled_stream(&plan.name, &plan.stream)
            };
            if let Err(e) = checked {
                self.skip(&mut report, spec, e);
                continue;
            }

            for nevr in &plan.packages {
                goal.install(nevr, &plan.repo_id)?;
            }
            self.track(&plan);
            report.completed.push(spec.to_string());
        }

        Ok(report)
    }

    fn plan_install(&self, spec: &str) -> Result<ModulePlan> {
        let (found, nsvap) = self.find_by_identifier(spec)?;

        let profiles = match nsvap.profile {
            Some(profile) => vec![profile],
            None => {
                let module = self
                    .get(found.name())
                    .ok_or_else(|| Error::NoModule(spec.to_string()))?;
                let defaults = self.default_policy.default_profiles(module, found.stream());
                if defaults.is_empty() {
                    return Err(Error::NoDefaultProfile(found.name().to_string()));
                }
                defaults
            }
        };

        plan_for(found, profiles)
    }

    fn autoenable(&mut self, plan: &ModulePlan) -> Result<()> {
        let enabled = self.get(&plan.name).and_then(Module::enabled_stream);
        if enabled != Some(plan.stream.as_str()) {
            self.enable_stream(&plan.name, &plan.stream, true, false)?;
        }
        Ok(())
    }

    /// Fail when the module is enabled on a stream other than `stream`
    fn check_enabled_stream(&self, name: &str, stream: &str) -> Result<()> {
        match self.get(name).and_then(Module::enabled_stream) {
            Some(enabled) if enabled != stream => Err(Error::StreamNotEnabled {
                module: name.to_string(),
                stream: stream.to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Request upgrades for each spec's installed profiles
    ///
    /// A spec without a profile upgrades every installed profile; naming a
    /// profile that is not installed is an error for that spec. Upgrades stay
    /// within the enabled stream: a spec resolving to another stream is
    /// skipped, use `enable` to switch.
    pub fn upgrade<S: AsRef<str>>(
        &mut self,
        specs: &[S],
        goal: &mut dyn PackageGoal,
    ) -> Result<BatchReport> {
        let mut report = BatchReport::default();

        for spec in specs.iter().map(AsRef::as_ref) {
            let plan = match self.plan_upgrade(spec) {
                Ok(plan) => plan,
                Err(e) => {
                    self.skip(&mut report, spec, e);
                    continue;
                }
            };

            for nevr in &plan.packages {
                goal.upgrade(nevr)?;
            }
            self.track(&plan);
            report.completed.push(spec.to_string());
        }

        Ok(report)
    }

    fn plan_upgrade(&self, spec: &str) -> Result<ModulePlan> {
        let (found, nsvap) = self.find_by_identifier(spec)?;
        self.check_enabled_stream(found.name(), found.stream())?;

        let installed: BTreeSet<String> = self
            .get(found.name())
            .and_then(Module::conf)
            .map(|c| c.profiles.clone())
            .unwrap_or_default();

        let profiles = match nsvap.profile {
            Some(profile) if !installed.contains(&profile) => {
                return Err(Error::ProfileNotInstalled(profile));
            }
            Some(profile) => vec![profile],
            None => installed.into_iter().collect(),
        };

        let mut plan = plan_for(found, profiles)?;
        // Upgrades only refresh what is installed; nothing new to record.
        plan.profiles.clear();
        Ok(plan)
    }

    /// Upgrade every enabled module, in name order
    pub fn upgrade_all(&mut self, goal: &mut dyn PackageGoal) -> Result<BatchReport> {
        let names: Vec<String> = self
            .modules
            .values()
            .filter(|m| m.is_enabled())
            .map(|m| m.name().to_string())
            .collect();
        self.upgrade(&names, goal)
    }

    fn track(&mut self, plan: &ModulePlan) {
        if self.transaction.is_saved() {
            self.transaction = ModuleTransaction::new();
        }
        if let Some(module) = self.modules.get_mut(&plan.name) {
            module.mark_installed(&plan.stream, plan.version, &plan.profiles);
            self.transaction.register(&plan.name);
        }
    }

    fn skip(&self, report: &mut BatchReport, spec: &str, err: Error) {
        self.reporter.error(&err.to_string());
        report.failed.push((spec.to_string(), err));
    }

    // =========================================================================
    // Transaction tracking
    // =========================================================================

    pub fn transaction(&self) -> &ModuleTransaction {
        &self.transaction
    }

    /// Start tracking a new package transaction, dropping pending state
    pub fn begin_transaction(&mut self) {
        for name in self.transaction.modules() {
            if let Some(module) = self.modules.get_mut(name) {
                module.discard_installed();
            }
        }
        self.transaction = ModuleTransaction::new();
    }

    /// Progress callback from the package transaction engine
    ///
    /// On the first post-transaction or verify step, every tracked module is
    /// enabled, gets its installed version and profiles recorded, and is
    /// persisted. Later calls do nothing. Returns whether the commit ran.
    pub fn transaction_progress(&mut self, action: TransactionAction) -> Result<bool> {
        if !self.transaction.checkpoint(action) {
            return Ok(false);
        }

        let mut first_error = None;
        let mut committed = 0;
        for name in self.transaction.modules() {
            let Some(module) = self.modules.get_mut(name) else {
                continue;
            };
            module.commit_installed();
            match persist(self.store.as_ref(), module) {
                Ok(()) => committed += 1,
                Err(e) => {
                    error!("Failed to save module {}: {}", name, e);
                    first_error.get_or_insert(e);
                }
            }
        }

        info!("Saved state of {} module(s) after {}", committed, action);
        match first_error {
            Some(e) => Err(e),
            None => Ok(true),
        }
    }
}

fn plan_for(found: &ModuleVersion, profiles: Vec<String>) -> Result<ModulePlan> {
    let mut packages = BTreeSet::new();
    for profile in &profiles {
        packages.extend(found.profile_nevra(profile)?);
    }
    Ok(ModulePlan {
        name: found.name().to_string(),
        stream: found.stream().to_string(),
        version: found.version(),
        repo_id: found.repo_id().to_string(),
        profiles,
        packages,
    })
}

fn persist(store: &dyn ModuleConfStore, module: &Module) -> Result<()> {
    match module.conf() {
        Some(conf) => store.write(conf),
        None => store.write(&ModuleConf::new(module.name())),
    }
}
