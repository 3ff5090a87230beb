#![forbid(unsafe_code)]

//! Package Validation Suite (pvs): runs registered checks against a package,
//! aggregates their outcomes, and reports what changed since the previous
//! release.
//!
//! Two engines do the work:
//! 1. **Check runner** — selects the checks registered for a validation
//!    context, runs each behind its own failure boundary, and aggregates the
//!    outcomes into a report.
//! 2. **Diff engine** — compares two package trees by relative path and file
//!    size and renders the `<name>@<version>.delta` report.
//!
//! # Library usage
//!
//! ```rust,no_run
//! use package_validation_suite::prelude::*;
//!
//! # fn main() -> package_validation_suite::core::errors::Result<()> {
//! let suite = ValidationSuite::new(CheckRegistry::with_builtin_checks(), "/tmp/pvs-results");
//! let provider = DirectoryManifestProvider::new("./my-package", Some("./my-package-1.0.0".into()));
//! let report = suite.validate_package(&provider, ValidationContext::Promotion)?;
//! println!("{}: {}", report.package_id, report.status());
//! # Ok(())
//! # }
//! ```

pub mod prelude;

pub mod checks;
pub mod core;
pub mod diff;
pub mod logger;
pub mod snapshot;
pub mod validation;
