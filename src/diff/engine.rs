//! Recursive size-based comparison of two package trees.
//!
//! Each level compares immediate files by name, then recurses into
//! subdirectories. A file on both sides is Modified when its byte length
//! differs and Unchanged otherwise; contents are never read. A directory
//! present on one side only is walked with the other side absent, so all of
//! its contents classify as Added or Removed.
//!
//! Recursion depth equals the nesting depth of the package tree.

#![allow(missing_docs)]

use std::collections::BTreeSet;
use std::ffi::OsString;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::errors::Result;
use crate::core::manifest::PackageManifestData;
use crate::core::paths::portable;
use crate::snapshot::fs::PackageFs;

pub const ADDED_TAG: &str = "  ++ADDED++";
pub const REMOVED_TAG: &str = "  --REMOVED--";
pub const MODIFIED_TAG: &str = "  (MODIFIED)";

const INDENT: &str = "    ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffKind {
    Added,
    Removed,
    Modified,
}

/// A single classified file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffEntry {
    pub kind: DiffKind,
    /// Path relative to the package root, `/`-separated.
    pub relative: String,
    /// Full path on the side the entry was recorded from: new side for Added,
    /// old side for Removed and Modified.
    pub path: PathBuf,
}

/// Output of one comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompareResult {
    pub added: Vec<DiffEntry>,
    pub removed: Vec<DiffEntry>,
    pub modified: Vec<DiffEntry>,
    /// Indented tree, one line per file or directory, `\n` terminated.
    pub tree: String,
}

impl CompareResult {
    #[must_use]
    pub fn has_changes(&self) -> bool {
        !(self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty())
    }

    fn record(&mut self, kind: DiffKind, relative: &Path, path: PathBuf) {
        let entry = DiffEntry {
            kind,
            relative: portable(relative),
            path,
        };
        match kind {
            DiffKind::Added => self.added.push(entry),
            DiffKind::Removed => self.removed.push(entry),
            DiffKind::Modified => self.modified.push(entry),
        }
    }

    fn line(&mut self, depth: usize, text: &str, tag: &str) {
        for _ in 0..depth {
            self.tree.push_str(INDENT);
        }
        let _ = writeln!(self.tree, "{text}{tag}");
    }
}

/// Compares package trees through a [`PackageFs`].
pub struct DiffEngine<'a> {
    fs: &'a dyn PackageFs,
}

impl<'a> DiffEngine<'a> {
    #[must_use]
    pub fn new(fs: &'a dyn PackageFs) -> Self {
        Self { fs }
    }

    /// Compare two roots; `None` stands for a side that does not exist.
    ///
    /// The roots' direct children render at one level of indentation.
    pub fn compare(&self, old: Option<&Path>, new: Option<&Path>) -> Result<CompareResult> {
        let mut result = CompareResult::default();
        self.compare_level(&mut result, old, new, Path::new(""), 1)?;
        Ok(result)
    }

    /// Compare the previous release against the current one, with the tree
    /// headed by a `<package-name>` line.
    pub fn compare_packages(
        &self,
        previous: &PackageManifestData,
        current: &PackageManifestData,
    ) -> Result<CompareResult> {
        let mut result = CompareResult::default();
        result.line(0, &format!("<{}>", current.name()), "");
        self.compare_level(
            &mut result,
            Some(previous.root()),
            Some(current.root()),
            Path::new(""),
            1,
        )?;
        Ok(result)
    }

    fn names(&self, dir: Option<&Path>, dirs: bool) -> Result<BTreeSet<OsString>> {
        let Some(dir) = dir else {
            return Ok(BTreeSet::new());
        };
        let listed = if dirs {
            self.fs.list_dirs(dir)?
        } else {
            self.fs.list_files(dir)?
        };
        Ok(listed
            .into_iter()
            .filter_map(|path| path.file_name().map(OsString::from))
            .collect())
    }

    fn compare_level(
        &self,
        result: &mut CompareResult,
        old: Option<&Path>,
        new: Option<&Path>,
        relative: &Path,
        depth: usize,
    ) -> Result<()> {
        let old_files = self.names(old, false)?;
        let new_files = self.names(new, false)?;

        if let Some(old_dir) = old {
            for name in &old_files {
                let display = name.to_string_lossy();
                let old_path = old_dir.join(name);
                match new.filter(|_| new_files.contains(name)) {
                    Some(new_dir) => {
                        let old_size = self.fs.file_size(&old_path)?;
                        let new_size = self.fs.file_size(&new_dir.join(name))?;
                        if old_size == new_size {
                            result.line(depth, &display, "");
                        } else {
                            result.line(depth, &display, MODIFIED_TAG);
                            result.record(DiffKind::Modified, &relative.join(name), old_path);
                        }
                    }
                    None => {
                        result.line(depth, &display, REMOVED_TAG);
                        result.record(DiffKind::Removed, &relative.join(name), old_path);
                    }
                }
            }
        }

        if let Some(new_dir) = new {
            for name in new_files.difference(&old_files) {
                result.line(depth, &name.to_string_lossy(), ADDED_TAG);
                result.record(DiffKind::Added, &relative.join(name), new_dir.join(name));
            }
        }

        let old_dirs = self.names(old, true)?;
        let new_dirs = self.names(new, true)?;

        for name in &old_dirs {
            let header = format!("<{}>", name.to_string_lossy());
            let old_sub = old.map(|dir| dir.join(name));
            let sub_relative = relative.join(name);
            if new_dirs.contains(name) {
                result.line(depth, &header, "");
                let new_sub = new.map(|dir| dir.join(name));
                self.compare_level(
                    result,
                    old_sub.as_deref(),
                    new_sub.as_deref(),
                    &sub_relative,
                    depth + 1,
                )?;
            } else {
                result.line(depth, &header, REMOVED_TAG);
                self.compare_level(result, old_sub.as_deref(), None, &sub_relative, depth + 1)?;
            }
        }

        for name in new_dirs.difference(&old_dirs) {
            result.line(depth, &format!("<{}>", name.to_string_lossy()), ADDED_TAG);
            let new_sub = new.map(|dir| dir.join(name));
            self.compare_level(
                result,
                None,
                new_sub.as_deref(),
                &relative.join(name),
                depth + 1,
            )?;
        }

        Ok(())
    }
}
