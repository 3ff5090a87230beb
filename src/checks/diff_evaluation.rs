//! Reports what changed in this version of the package relative to the previous one.

use crate::core::errors::Result;
use crate::diff::engine::DiffEngine;
use crate::diff::report::write_delta_report;
use crate::validation::check::{Check, CheckContext, CheckDescriptor};
use crate::validation::context::{CheckCategory, ValidationContext};
use crate::validation::outcome::{CheckVerdict, MessageRecorder};

pub const ID: &str = "diff-evaluation";

/// Message recorded when there is nothing to compare against.
pub const NO_PREVIOUS_VERSION: &str = "No previous package version. Skipping diff evaluation.";

/// Compares the current package against its previous release and writes the
/// `.delta` report.
#[derive(Debug)]
pub struct DiffEvaluation {
    descriptor: CheckDescriptor,
}

impl DiffEvaluation {
    #[must_use]
    pub fn new() -> Self {
        Self {
            descriptor: CheckDescriptor::new(
                ID,
                "Package Diff Evaluation",
                CheckCategory::DataValidation,
                "Produces a report of what's been changed in this version of the package.",
                &[
                    ValidationContext::AssetStore,
                    ValidationContext::LocalDevelopment,
                    ValidationContext::LocalDevelopmentInternal,
                    ValidationContext::Promotion,
                ],
            ),
        }
    }
}

impl Default for DiffEvaluation {
    fn default() -> Self {
        Self::new()
    }
}

impl Check for DiffEvaluation {
    fn descriptor(&self) -> &CheckDescriptor {
        &self.descriptor
    }

    fn run(&self, ctx: &CheckContext<'_>) -> Result<CheckVerdict> {
        let Some(previous) = ctx.snapshot.previous.as_ref() else {
            return Ok(CheckVerdict::skip(NO_PREVIOUS_VERSION));
        };
        let current = &ctx.snapshot.current;

        let result = DiffEngine::new(ctx.fs).compare_packages(previous, current)?;

        let mut recorder = MessageRecorder::new();
        recorder.info(format!(
            "Compared {} against {}: {} added, {} removed, {} modified.",
            current.version(),
            previous.version(),
            result.added.len(),
            result.removed.len(),
            result.modified.len()
        ));
        if ctx.write_delta_reports {
            let path = write_delta_report(ctx.results_dir, current, previous, &result)?;
            recorder.info(format!("Delta report written to {}", path.display()));
        }
        Ok(recorder.finish())
    }
}
