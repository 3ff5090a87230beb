//! Delta report text layout and persistence.

#![allow(missing_docs)]

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::errors::{PvsError, Result};
use crate::core::manifest::PackageManifestData;
use crate::diff::engine::{CompareResult, DiffEntry};

const TITLE: &str = "Package Update Delta Evaluation";
const TREE_HEADING: &str = "Package Tree";

/// Render the full `.delta` document. Deterministic for identical input.
#[must_use]
pub fn render_delta_report(
    current: &PackageManifestData,
    previous: &PackageManifestData,
    result: &CompareResult,
) -> String {
    let mut out = String::new();
    heading(&mut out, TITLE);
    out.push('\n');
    let _ = writeln!(out, "Package Name: {}", current.name());
    let _ = writeln!(out, "Package Version: {}", current.version());
    let _ = writeln!(out, "Compared to Version: {}", previous.version());
    out.push('\n');

    section(&mut out, "New in package:", &result.added);
    section(&mut out, "Removed from package:", &result.removed);
    section(&mut out, "Modified:", &result.modified);

    out.push('\n');
    heading(&mut out, TREE_HEADING);
    out.push('\n');
    out.push_str(&result.tree);
    out
}

/// Write `<name>@<version>.delta` under `output_dir`, replacing any earlier
/// artifact for the same package version.
pub fn write_delta_report(
    output_dir: &Path,
    current: &PackageManifestData,
    previous: &PackageManifestData,
    result: &CompareResult,
) -> Result<PathBuf> {
    fs::create_dir_all(output_dir).map_err(|source| PvsError::io(output_dir, source))?;
    let path = delta_report_path(output_dir, current);
    let body = render_delta_report(current, previous, result);
    fs::write(&path, body).map_err(|source| PvsError::io(&path, source))?;
    Ok(path)
}

/// Location of the delta artifact for `current` inside `output_dir`.
#[must_use]
pub fn delta_report_path(output_dir: &Path, current: &PackageManifestData) -> PathBuf {
    output_dir.join(current.id().delta_file_name())
}

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}", "-".repeat(title.len()));
}

fn section(out: &mut String, title: &str, entries: &[DiffEntry]) {
    if entries.is_empty() {
        return;
    }
    let _ = writeln!(out, "{title}");
    for entry in entries {
        let _ = writeln!(out, "    {}", entry.relative);
    }
    out.push('\n');
}
