//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use package_validation_suite::prelude::*;
//! ```

// Core
pub use crate::core::config::Config;
pub use crate::core::errors::{PvsError, Result};
pub use crate::core::manifest::{
    DirectoryManifestProvider, ManifestProvider, PackageId, PackageManifestData, PackageSnapshot,
    StaticManifestProvider,
};

// Snapshot
pub use crate::snapshot::fs::{PackageFs, StdFs};
pub use crate::snapshot::walker::{DirectoryItem, ItemKind, TreeWalker, find_files};

// Diff
pub use crate::diff::engine::{CompareResult, DiffEngine, DiffEntry, DiffKind};
pub use crate::diff::report::{render_delta_report, write_delta_report};

// Validation
pub use crate::validation::check::{Check, CheckContext, CheckDescriptor};
pub use crate::validation::context::{CheckCategory, ValidationContext};
pub use crate::validation::outcome::{
    CheckMessage, CheckOutcome, CheckState, CheckVerdict, MessageRecorder, Severity,
};
pub use crate::validation::registry::CheckRegistry;
pub use crate::validation::report::{ReportStatus, ValidationReport};
pub use crate::validation::runner::CheckRunner;
pub use crate::validation::store::ReportStore;
pub use crate::validation::suite::ValidationSuite;

// Logging
pub use crate::logger::ActivityLog;
pub use crate::logger::jsonl::{JsonlConfig, JsonlWriter};
