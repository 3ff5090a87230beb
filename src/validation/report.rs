//! Aggregated result of one validation pass.

#![allow(missing_docs)]

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::manifest::PackageId;
use crate::validation::context::ValidationContext;
use crate::validation::outcome::{CheckMessage, CheckOutcome, CheckState};

/// Three-way summary for quick scanning; Failed outranks Warnings outranks Success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Success,
    Warnings,
    Failed,
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "Success",
            Self::Warnings => "Warnings",
            Self::Failed => "Failed",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub package_id: PackageId,
    pub name: String,
    pub version: String,
    pub context: ValidationContext,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    /// One entry per executed check, in registration order.
    pub outcomes: Vec<CheckOutcome>,
}

impl ValidationReport {
    /// False iff any executed check ended Failed.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        !self
            .outcomes
            .iter()
            .any(|outcome| outcome.state == CheckState::Failed)
    }

    /// Warning messages across all checks, paired with the emitting check id.
    pub fn warnings(&self) -> impl Iterator<Item = (&str, &CheckMessage)> {
        self.outcomes.iter().flat_map(|outcome| {
            outcome
                .warnings()
                .map(move |message| (outcome.id.as_str(), message))
        })
    }

    #[must_use]
    pub fn status(&self) -> ReportStatus {
        if !self.succeeded() {
            ReportStatus::Failed
        } else if self.outcomes.iter().any(CheckOutcome::has_warnings) {
            ReportStatus::Warnings
        } else {
            ReportStatus::Success
        }
    }

    pub fn outcome(&self, check_id: &str) -> Option<&CheckOutcome> {
        self.outcomes.iter().find(|outcome| outcome.id == check_id)
    }

    pub fn count(&self, state: CheckState) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.state == state)
            .count()
    }
}
