// src/module/nsvap.rs

//! Module identifiers parsed from user input
//!
//! A module spec is written like a package spec,
//! `name[-stream[-version]][.arch]`, with an optional `/profile` suffix.
//! Since names and streams may themselves contain dashes and dots, a spec
//! is ambiguous; [`ModuleSubject`] yields every plausible reading, most
//! specific first, and the registry takes the first one that resolves.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Name, stream, version, arch and profile of a module selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Nsvap {
    pub name: String,
    pub stream: Option<String>,
    pub version: Option<u64>,
    /// Accepted and carried, not yet used to filter resolution
    pub arch: Option<String>,
    pub profile: Option<String>,
}

impl Nsvap {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_stream(mut self, stream: impl Into<String>) -> Self {
        self.stream = Some(stream.into());
        self
    }

    pub fn with_version(mut self, version: u64) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_arch(mut self, arch: impl Into<String>) -> Self {
        self.arch = Some(arch.into());
        self
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }
}

impl fmt::Display for Nsvap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "name={}", self.name)?;
        if let Some(ref stream) = self.stream {
            write!(f, ", stream={}", stream)?;
        }
        if let Some(version) = self.version {
            write!(f, ", version={}", version)?;
        }
        if let Some(ref arch) = self.arch {
            write!(f, ", arch={}", arch)?;
        }
        if let Some(ref profile) = self.profile {
            write!(f, ", profile={}", profile)?;
        }
        Ok(())
    }
}

/// Shapes a spec (minus its profile) can be read as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NsvaForm {
    /// `name-stream-version.arch`
    Nsva,
    /// `name-stream-version`
    Nsv,
    /// `name-stream`
    Ns,
    /// `name.arch`
    Na,
    /// `name`
    Name,
}

impl NsvaForm {
    /// Forms in the order candidates are tried
    pub const MOST_SPECIFIC: [NsvaForm; 5] = [
        NsvaForm::Nsva,
        NsvaForm::Nsv,
        NsvaForm::Ns,
        NsvaForm::Na,
        NsvaForm::Name,
    ];
}

static NSVA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+)-([^-:]+)-(.+)\.([^.]+)$").expect("valid regex"));
static NSV_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+)-([^-:]+)-(.+)$").expect("valid regex"));
static NS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+)-([^-:]+)$").expect("valid regex"));
static NA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+)\.([^.]+)$").expect("valid regex"));

/// Candidate fields before the version is validated
struct RawNsva<'s> {
    name: &'s str,
    stream: Option<&'s str>,
    version: Option<&'s str>,
    arch: Option<&'s str>,
}

impl NsvaForm {
    fn parse<'s>(&self, nsva: &'s str) -> Option<RawNsva<'s>> {
        let group = |caps: &regex::Captures<'s>, i: usize| caps.get(i).map(|m| m.as_str());
        match self {
            NsvaForm::Nsva => NSVA_RE.captures(nsva).map(|c| RawNsva {
                name: group(&c, 1).unwrap_or_default(),
                stream: group(&c, 2),
                version: group(&c, 3),
                arch: group(&c, 4),
            }),
            NsvaForm::Nsv => NSV_RE.captures(nsva).map(|c| RawNsva {
                name: group(&c, 1).unwrap_or_default(),
                stream: group(&c, 2),
                version: group(&c, 3),
                arch: None,
            }),
            NsvaForm::Ns => NS_RE.captures(nsva).map(|c| RawNsva {
                name: group(&c, 1).unwrap_or_default(),
                stream: group(&c, 2),
                version: None,
                arch: None,
            }),
            NsvaForm::Na => NA_RE.captures(nsva).map(|c| RawNsva {
                name: group(&c, 1).unwrap_or_default(),
                stream: None,
                version: None,
                arch: group(&c, 2),
            }),
            NsvaForm::Name => (!nsva.is_empty()).then_some(RawNsva {
                name: nsva,
                stream: None,
                version: None,
                arch: None,
            }),
        }
    }
}

/// User input to be matched against the module registry
#[derive(Debug, Clone)]
pub struct ModuleSubject<'a> {
    spec: &'a str,
}

impl<'a> ModuleSubject<'a> {
    pub fn new(spec: &'a str) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &'a str {
        self.spec
    }

    /// All readings of the spec, most specific first
    pub fn nsvap_possibilities(&self) -> Vec<Nsvap> {
        self.nsvap_possibilities_with_forms(&NsvaForm::MOST_SPECIFIC)
    }

    /// Readings of the spec restricted to `forms`, in the order given
    ///
    /// Readings whose version is not a non-negative integer are dropped.
    pub fn nsvap_possibilities_with_forms(&self, forms: &[NsvaForm]) -> Vec<Nsvap> {
        let (nsva, profile) = split_profile(self.spec);

        forms
            .iter()
            .filter_map(|form| form.parse(nsva))
            .filter_map(|raw| {
                let version = match raw.version {
                    Some(v) => Some(v.parse::<u64>().ok()?),
                    None => None,
                };
                Some(Nsvap {
                    name: raw.name.to_string(),
                    stream: raw.stream.map(str::to_string),
                    version,
                    arch: raw.arch.map(str::to_string),
                    profile: profile.map(str::to_string),
                })
            })
            .collect()
    }
}

/// Split off a trailing `/profile`; a blank profile counts as none
fn split_profile(spec: &str) -> (&str, Option<&str>) {
    match spec.rsplit_once('/') {
        Some((nsva, profile)) if profile.trim().is_empty() => (nsva, None),
        Some((nsva, profile)) => (nsva, Some(profile)),
        None => (spec, None),
    }
}
