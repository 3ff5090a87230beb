//! Check messages, verdicts, and terminal outcomes.

#![allow(missing_docs)]

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::validation::context::CheckCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Information,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Information => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckMessage {
    pub severity: Severity,
    pub text: String,
}

impl CheckMessage {
    pub fn new(severity: Severity, text: impl Into<String>) -> Self {
        Self {
            severity,
            text: text.into(),
        }
    }
}

/// Terminal state of one check execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckState {
    Succeeded,
    Failed,
    NotRun,
}

impl fmt::Display for CheckState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::NotRun => "not_run",
        })
    }
}

/// What a check hands back to the runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckVerdict {
    /// Preconditions unmet; the check did not evaluate anything.
    Skip { reason: String },
    /// The check ran. `passed == false` or any Error message marks it Failed.
    Outcome {
        messages: Vec<CheckMessage>,
        passed: bool,
    },
}

impl CheckVerdict {
    pub fn skip(reason: impl Into<String>) -> Self {
        Self::Skip {
            reason: reason.into(),
        }
    }
}

/// Recorded result of one executed check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub id: String,
    pub name: String,
    pub category: CheckCategory,
    pub state: CheckState,
    pub messages: Vec<CheckMessage>,
    pub elapsed_ms: u64,
}

impl CheckOutcome {
    pub fn has_warnings(&self) -> bool {
        self.count(Severity::Warning) > 0
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.messages
            .iter()
            .filter(|message| message.severity == severity)
            .count()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &CheckMessage> {
        self.messages
            .iter()
            .filter(|message| message.severity == Severity::Warning)
    }
}

/// Accumulates messages while a check runs, then turns them into a verdict.
#[derive(Debug, Default)]
pub struct MessageRecorder {
    messages: Vec<CheckMessage>,
    failed: bool,
}

impl MessageRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.messages.push(CheckMessage::new(Severity::Information, text));
    }

    pub fn warn(&mut self, text: impl Into<String>) {
        self.messages.push(CheckMessage::new(Severity::Warning, text));
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.failed = true;
        self.messages.push(CheckMessage::new(Severity::Error, text));
    }

    /// One warning for a group of offending paths, then one Information line
    /// per path. Nothing is recorded when `paths` is empty.
    pub fn warn_for_paths<P: AsRef<Path>>(&mut self, paths: &[P], warning: &str, info_prefix: &str) {
        if paths.is_empty() {
            return;
        }
        self.warn(warning);
        for path in paths {
            self.info(format!("{info_prefix}{}", path.as_ref().display()));
        }
    }

    pub fn messages(&self) -> &[CheckMessage] {
        &self.messages
    }

    pub fn finish(self) -> CheckVerdict {
        CheckVerdict::Outcome {
            passed: !self.failed,
            messages: self.messages,
        }
    }
}
