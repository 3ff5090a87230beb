//! Completed reports keyed by `name@version`.
//!
//! The store lives as long as its owner. Reports can additionally be written
//! as `<name>@<version>.json` next to the `.delta` artifacts so a later
//! process can query them.

#![allow(missing_docs)]

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use crate::core::errors::{PvsError, Result};
use crate::core::manifest::PackageId;
use crate::validation::report::ValidationReport;

#[derive(Debug, Default)]
pub struct ReportStore {
    reports: RwLock<BTreeMap<PackageId, ValidationReport>>,
    results_dir: Option<PathBuf>,
    persist: bool,
}

impl ReportStore {
    /// Store with no disk presence at all.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Store rooted at `results_dir`; reports are written there when `persist` is set.
    #[must_use]
    pub fn at(results_dir: impl Into<PathBuf>, persist: bool) -> Self {
        Self {
            reports: RwLock::new(BTreeMap::new()),
            results_dir: Some(results_dir.into()),
            persist,
        }
    }

    #[must_use]
    pub fn results_dir(&self) -> Option<&Path> {
        self.results_dir.as_deref()
    }

    /// Record a report, replacing any earlier one for the same package version.
    pub fn insert(&self, report: ValidationReport) -> Result<()> {
        if self.persist
            && let Some(path) = self.report_path(&report.package_id)
        {
            let parent = path.parent().unwrap_or_else(|| Path::new("."));
            fs::create_dir_all(parent).map_err(|source| PvsError::io(parent, source))?;
            let body = serde_json::to_string_pretty(&report)?;
            fs::write(&path, body).map_err(|source| PvsError::io(&path, source))?;
        }
        self.reports.write().insert(report.package_id.clone(), report);
        Ok(())
    }

    /// Report for `id`, falling back to a persisted copy on disk.
    pub fn get(&self, id: &PackageId) -> Result<Option<ValidationReport>> {
        if let Some(report) = self.reports.read().get(id) {
            return Ok(Some(report.clone()));
        }
        let Some(path) = self.report_path(id) else {
            return Ok(None);
        };
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(PvsError::io(&path, source)),
        };
        let report: ValidationReport = serde_json::from_str(&raw)?;
        self.reports.write().insert(id.clone(), report.clone());
        Ok(Some(report))
    }

    #[must_use]
    pub fn contains(&self, id: &PackageId) -> bool {
        self.reports.read().contains_key(id)
            || self.report_path(id).is_some_and(|path| path.is_file())
    }

    /// Drop in-memory reports. Persisted files are left alone.
    pub fn clear(&self) {
        self.reports.write().clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.reports.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reports.read().is_empty()
    }

    #[must_use]
    pub fn delta_report_path(&self, id: &PackageId) -> Option<PathBuf> {
        self.results_dir
            .as_ref()
            .map(|dir| dir.join(id.delta_file_name()))
    }

    #[must_use]
    pub fn has_delta_report(&self, id: &PackageId) -> bool {
        self.delta_report_path(id).is_some_and(|path| path.is_file())
    }

    fn report_path(&self, id: &PackageId) -> Option<PathBuf> {
        self.results_dir
            .as_ref()
            .map(|dir| dir.join(id.report_file_name()))
    }
}
