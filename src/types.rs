use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use crate::decompile::DecompilerKind;

/// `major.minor` as reported by the unpacker or the local interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PythonVersion {
    pub major: u32,
    pub minor: u32,
}

impl PythonVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl Display for PythonVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid python version '{0}'")]
pub struct ParseVersionError(String);

impl FromStr for PythonVersion {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseVersionError(s.to_string());
        let (major, minor) = s.trim().split_once('.').ok_or_else(err)?;
        Ok(Self {
            major: major.parse().map_err(|_| err())?,
            minor: minor.parse().map_err(|_| err())?,
        })
    }
}

/// What the unpacker produced: an existing directory plus the detected version, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub dir: PathBuf,
    pub version: Option<PythonVersion>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecompileReport {
    pub decompiler: DecompilerKind,
    pub succeeded: usize,
    pub failed: usize,
    pub relocated: usize,
    /// Recovered sources that could not be moved into the output tree.
    pub unmoved: usize,
}

impl DecompileReport {
    pub fn is_success(&self) -> bool {
        self.succeeded > 0
    }
}

impl Display for DecompileReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} succeeded, {} failed", self.succeeded, self.failed)
    }
}
