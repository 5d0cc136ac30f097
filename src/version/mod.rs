// src/version/mod.rs

//! RPM version strings as they appear in module artifact lists
//!
//! Module metadata lists its packages as NEVRA strings
//! (`name-[epoch:]version-release.arch`). Package operations are requested
//! by NEVR with a trivial epoch dropped, so this module provides parsing for
//! both pieces and the normalised display form.

use crate::error::{Error, Result};
use std::fmt;

/// Architectures recognised as a trailing `.arch` suffix of an artifact
pub const KNOWN_ARCHES: &[&str] = &[
    "noarch", "src", "nosrc", "x86_64", "i386", "i486", "i586", "i686", "athlon", "aarch64",
    "armv7hl", "armv7hnl", "armv7l", "ppc64", "ppc64le", "s390", "s390x", "riscv64",
];

/// A parsed RPM version with epoch, version, and release components
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RpmVersion {
    pub epoch: u64,
    pub version: String,
    pub release: Option<String>,
}

impl RpmVersion {
    /// Parse an RPM version string
    ///
    /// Format: [epoch:]version[-release]
    /// Examples:
    /// - "1.2.3" → epoch=0, version="1.2.3", release=None
    /// - "0:1.2.3-4" → epoch=0, version="1.2.3", release=Some("4")
    /// - "1:2.3.4-5.el8" → epoch=1, version="2.3.4", release=Some("5.el8")
    pub fn parse(s: &str) -> Result<Self> {
        let (epoch_str, rest) = match s.split_once(':') {
            Some((e, r)) => (e, r),
            None => ("0", s),
        };

        let epoch = if epoch_str.is_empty() {
            0
        } else {
            epoch_str
                .parse::<u64>()
                .map_err(|e| Error::InvalidVersion(s.to_string(), format!("bad epoch: {}", e)))?
        };

        let (version, release) = match rest.split_once('-') {
            Some((v, r)) => (v.to_string(), Some(r.to_string())),
            None => (rest.to_string(), None),
        };

        if version.is_empty() {
            return Err(Error::InvalidVersion(
                s.to_string(),
                "empty version component".to_string(),
            ));
        }

        Ok(Self {
            epoch,
            version,
            release,
        })
    }
}

impl fmt::Display for RpmVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.epoch > 0 {
            write!(f, "{}:", self.epoch)?;
        }
        write!(f, "{}", self.version)?;
        if let Some(ref release) = self.release {
            write!(f, "-{}", release)?;
        }
        Ok(())
    }
}

/// A package artifact: name, evr and optional architecture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nevra {
    pub name: String,
    pub evr: RpmVersion,
    pub arch: Option<String>,
}

impl Nevra {
    /// Parse `name-[epoch:]version-release[.arch]`
    ///
    /// The arch suffix is only split off when it names a known architecture,
    /// so `bar-1.0-1` and `bar-1.0-1.fc28` both keep their full release.
    pub fn parse(s: &str) -> Result<Self> {
        let (nevr, arch) = match s.rsplit_once('.') {
            Some((head, arch)) if KNOWN_ARCHES.contains(&arch) => (head, Some(arch.to_string())),
            _ => (s, None),
        };

        let (rest, release) = nevr
            .rsplit_once('-')
            .ok_or_else(|| Error::InvalidArtifact(s.to_string()))?;
        let (name, version) = rest
            .rsplit_once('-')
            .ok_or_else(|| Error::InvalidArtifact(s.to_string()))?;

        if name.is_empty() || release.is_empty() {
            return Err(Error::InvalidArtifact(s.to_string()));
        }

        let evr = RpmVersion::parse(&format!("{}-{}", version, release))?;

        Ok(Self {
            name: name.to_string(),
            evr,
            arch,
        })
    }

    /// Name plus normalised evr, the form handed to the package goal
    pub fn nevr(&self) -> String {
        format!("{}-{}", self.name, self.evr)
    }
}

impl fmt::Display for Nevra {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.nevr())?;
        if let Some(ref arch) = self.arch {
            write!(f, ".{}", arch)?;
        }
        Ok(())
    }
}
