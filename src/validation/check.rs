//! The check capability and its descriptor.

#![allow(missing_docs)]

use std::path::Path;

use serde::Serialize;

use crate::core::errors::Result;
use crate::core::manifest::PackageSnapshot;
use crate::snapshot::fs::PackageFs;
use crate::validation::context::{CheckCategory, ValidationContext};
use crate::validation::outcome::CheckVerdict;

/// Identity and applicability of a check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckDescriptor {
    /// Stable unique key, e.g. `diff-evaluation`.
    pub id: String,
    pub name: String,
    pub category: CheckCategory,
    pub description: String,
    pub contexts: Vec<ValidationContext>,
}

impl CheckDescriptor {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: CheckCategory,
        description: impl Into<String>,
        contexts: &[ValidationContext],
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            description: description.into(),
            contexts: contexts.to_vec(),
        }
    }

    #[must_use]
    pub fn supports(&self, context: ValidationContext) -> bool {
        self.contexts.contains(&context)
    }
}

/// Everything a check may read during one validation pass.
#[derive(Clone, Copy)]
pub struct CheckContext<'a> {
    pub snapshot: &'a PackageSnapshot,
    pub context: ValidationContext,
    pub fs: &'a dyn PackageFs,
    /// Directory receiving text artifacts such as `.delta` reports.
    pub results_dir: &'a Path,
    pub write_delta_reports: bool,
}

/// A single independent validation rule.
///
/// Implementations report rule violations through the returned verdict.
/// `Err` is reserved for infrastructure faults; the runner records it, like a
/// panic, as a Failed outcome for this check alone.
pub trait Check: Send + Sync {
    fn descriptor(&self) -> &CheckDescriptor;
    fn run(&self, ctx: &CheckContext<'_>) -> Result<CheckVerdict>;
}
