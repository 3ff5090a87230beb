//! Filesystem collaborator consumed by the walker and the diff engine.

#![allow(missing_docs)]

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::core::errors::{PvsError, Result};
use crate::core::paths::long_path;

/// Read-only view of a package tree.
///
/// Listings return full paths (the directory joined with each entry name) in
/// the order the backing store enumerates them.
pub trait PackageFs: Send + Sync {
    /// Immediate non-directory entries of `dir`.
    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>>;
    /// Immediate subdirectories of `dir`.
    fn list_dirs(&self, dir: &Path) -> Result<Vec<PathBuf>>;
    fn file_size(&self, path: &Path) -> Result<u64>;
    /// `Ok(false)` only for a missing path; every other failure is surfaced.
    fn exists(&self, path: &Path) -> Result<bool>;
    fn is_dir(&self, path: &Path) -> Result<bool>;
}

/// Host filesystem, tolerant of paths beyond the Windows `MAX_PATH` limit.
///
/// Entries are classified without following symlinks: a symlink is listed as a
/// file and its size is the size of the link itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFs;

impl StdFs {
    fn entries(dir: &Path, want_dirs: bool) -> Result<Vec<PathBuf>> {
        let reader = fs::read_dir(long_path(dir)).map_err(|source| PvsError::io(dir, source))?;
        let mut out = Vec::new();
        for entry in reader {
            let entry = entry.map_err(|source| PvsError::io(dir, source))?;
            let file_type = entry
                .file_type()
                .map_err(|source| PvsError::io(dir.join(entry.file_name()), source))?;
            if file_type.is_dir() == want_dirs {
                out.push(dir.join(entry.file_name()));
            }
        }
        Ok(out)
    }
}

impl PackageFs for StdFs {
    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        Self::entries(dir, false)
    }

    fn list_dirs(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        Self::entries(dir, true)
    }

    fn file_size(&self, path: &Path) -> Result<u64> {
        fs::symlink_metadata(long_path(path))
            .map(|meta| meta.len())
            .map_err(|source| PvsError::io(path, source))
    }

    fn exists(&self, path: &Path) -> Result<bool> {
        match fs::symlink_metadata(long_path(path)) {
            Ok(_) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(PvsError::io(path, source)),
        }
    }

    fn is_dir(&self, path: &Path) -> Result<bool> {
        match fs::symlink_metadata(long_path(path)) {
            Ok(meta) => Ok(meta.is_dir()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(PvsError::io(path, source)),
        }
    }
}
