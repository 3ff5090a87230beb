//! Package manifests: identity, version, and root of a package at one point in time.

#![allow(missing_docs)]

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{PvsError, Result};

/// Name of the manifest file read from a package root.
pub const MANIFEST_FILE: &str = "package.json";

/// `name@version` key identifying a report and its delta artifact.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PackageId(String);

impl PackageId {
    pub fn new(name: &str, version: &str) -> Result<Self> {
        if name.trim().is_empty() {
            return Err(PvsError::InvalidPackageId {
                details: "package name is empty".to_string(),
            });
        }
        if version.trim().is_empty() {
            return Err(PvsError::InvalidPackageId {
                details: format!("package {name} has an empty version"),
            });
        }
        Ok(Self(format!("{name}@{version}")))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the delta artifact for this package.
    #[must_use]
    pub fn delta_file_name(&self) -> String {
        format!("{}.delta", self.file_stem())
    }

    /// File name of the persisted JSON report for this package.
    #[must_use]
    pub fn report_file_name(&self) -> String {
        format!("{}.json", self.file_stem())
    }

    /// The id as one path component: separators and `%` are percent-encoded,
    /// so scoped names like `@scope/tool` and names containing `../` stay
    /// inside the directory they are joined onto.
    fn file_stem(&self) -> String {
        let mut stem = String::with_capacity(self.0.len());
        for c in self.0.chars() {
            match c {
                '%' => stem.push_str("%25"),
                '/' => stem.push_str("%2F"),
                '\\' => stem.push_str("%5C"),
                ':' => stem.push_str("%3A"),
                c => stem.push(c),
            }
        }
        stem
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for PackageId {
    type Err = PvsError;

    // Scoped npm names start with '@', so split on the last one.
    fn from_str(raw: &str) -> Result<Self> {
        let (name, version) = raw.rsplit_once('@').filter(|(name, _)| !name.is_empty()).ok_or_else(|| {
            PvsError::InvalidPackageId {
                details: format!("expected name@version, got {raw:?}"),
            }
        })?;
        Self::new(name, version)
    }
}

impl TryFrom<String> for PackageId {
    type Error = PvsError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<PackageId> for String {
    fn from(value: PackageId) -> Self {
        value.0
    }
}

/// Immutable descriptor of a package: name, semantic version, root directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManifestData {
    name: String,
    version: semver::Version,
    root: PathBuf,
}

impl PackageManifestData {
    pub fn new(name: impl Into<String>, version: &str, root: impl Into<PathBuf>) -> Result<Self> {
        let name = name.into();
        let root = root.into();
        if name.trim().is_empty() {
            return Err(PvsError::InvalidManifest {
                path: root,
                details: "package name is empty".to_string(),
            });
        }
        let version = semver::Version::parse(version.trim()).map_err(|error| {
            PvsError::InvalidManifest {
                path: root.clone(),
                details: format!("version {version:?} is not a semantic version: {error}"),
            }
        })?;
        Ok(Self {
            name,
            version,
            root,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn version(&self) -> &semver::Version {
        &self.version
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn id(&self) -> PackageId {
        PackageId(format!("{}@{}", self.name, self.version))
    }

    /// Pre-release tag present, or still in the 0.x series.
    #[must_use]
    pub fn is_preview(&self) -> bool {
        self.version.major == 0 || !self.version.pre.is_empty()
    }
}

/// The package under validation plus its previous release, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSnapshot {
    pub current: PackageManifestData,
    pub previous: Option<PackageManifestData>,
}

impl PackageSnapshot {
    #[must_use]
    pub fn new(current: PackageManifestData, previous: Option<PackageManifestData>) -> Self {
        Self { current, previous }
    }

    #[must_use]
    pub fn id(&self) -> PackageId {
        self.current.id()
    }
}

/// Source of manifest data for the current and previous package state.
pub trait ManifestProvider {
    fn current(&self) -> Result<PackageManifestData>;
    fn previous(&self) -> Result<Option<PackageManifestData>>;

    fn snapshot(&self) -> Result<PackageSnapshot> {
        Ok(PackageSnapshot::new(self.current()?, self.previous()?))
    }
}

#[derive(Deserialize)]
struct ManifestFile {
    name: Option<String>,
    version: Option<String>,
}

/// Reads `package.json` from each package root.
#[derive(Debug, Clone)]
pub struct DirectoryManifestProvider {
    current_root: PathBuf,
    previous_root: Option<PathBuf>,
}

impl DirectoryManifestProvider {
    pub fn new(current_root: impl Into<PathBuf>, previous_root: Option<PathBuf>) -> Self {
        Self {
            current_root: current_root.into(),
            previous_root,
        }
    }

    /// Parse the manifest at `root/package.json`.
    pub fn read(root: &Path) -> Result<PackageManifestData> {
        let manifest_path = root.join(MANIFEST_FILE);
        let raw = fs::read_to_string(&manifest_path)
            .map_err(|source| PvsError::io(&manifest_path, source))?;
        let parsed: ManifestFile =
            serde_json::from_str(&raw).map_err(|error| PvsError::InvalidManifest {
                path: manifest_path.clone(),
                details: error.to_string(),
            })?;
        let name = parsed.name.ok_or_else(|| PvsError::InvalidManifest {
            path: manifest_path.clone(),
            details: "missing \"name\"".to_string(),
        })?;
        let version = parsed.version.ok_or_else(|| PvsError::InvalidManifest {
            path: manifest_path.clone(),
            details: "missing \"version\"".to_string(),
        })?;
        PackageManifestData::new(name, &version, root).map_err(|error| match error {
            PvsError::InvalidManifest { details, .. } => PvsError::InvalidManifest {
                path: manifest_path.clone(),
                details,
            },
            other => other,
        })
    }
}

impl ManifestProvider for DirectoryManifestProvider {
    fn current(&self) -> Result<PackageManifestData> {
        Self::read(&self.current_root)
    }

    fn previous(&self) -> Result<Option<PackageManifestData>> {
        self.previous_root.as_deref().map(Self::read).transpose()
    }
}

/// Manifest data supplied up front by the caller.
#[derive(Debug, Clone)]
pub struct StaticManifestProvider {
    snapshot: PackageSnapshot,
}

impl StaticManifestProvider {
    #[must_use]
    pub fn new(snapshot: PackageSnapshot) -> Self {
        Self { snapshot }
    }
}

impl ManifestProvider for StaticManifestProvider {
    fn current(&self) -> Result<PackageManifestData> {
        Ok(self.snapshot.current.clone())
    }

    fn previous(&self) -> Result<Option<PackageManifestData>> {
        Ok(self.snapshot.previous.clone())
    }
}
