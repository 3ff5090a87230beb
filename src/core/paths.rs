//! Shared path manipulation utilities.

use std::env;
use std::path::{Component, Path, PathBuf};

/// Resolve a package root given on the command line to an absolute path.
///
/// Existing paths are canonicalized. Missing paths are joined onto the CWD and
/// `..`/`.` components are resolved syntactically, so a missing previous
/// version still yields a stable path for error messages.
pub fn resolve_absolute_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
    };

    if let Ok(canonical) = std::fs::canonicalize(&absolute) {
        return strip_verbatim_prefix(canonical);
    }

    normalize_syntactic(&absolute)
}

/// Render a relative path with `/` separators regardless of platform.
pub fn portable(path: &Path) -> String {
    let mut out = String::new();
    for component in path.components() {
        if let Component::Normal(part) = component {
            if !out.is_empty() {
                out.push('/');
            }
            out.push_str(&part.to_string_lossy());
        }
    }
    out
}

/// Convert an absolute path into the form handed to the OS for filesystem calls.
///
/// On Windows this is the `\\?\` extended-length form so deep package trees
/// are not cut off at `MAX_PATH`. Elsewhere the path is returned unchanged.
pub fn long_path(path: &Path) -> PathBuf {
    #[cfg(windows)]
    {
        let raw = path.as_os_str().to_string_lossy();
        if path.is_absolute() && !raw.starts_with(r"\\?\") {
            if let Some(unc) = raw.strip_prefix(r"\\") {
                return PathBuf::from(format!(r"\\?\UNC\{unc}"));
            }
            return PathBuf::from(format!(r"\\?\{raw}"));
        }
    }
    path.to_path_buf()
}

// canonicalize on Windows returns verbatim paths; callers expect the plain form.
fn strip_verbatim_prefix(path: PathBuf) -> PathBuf {
    #[cfg(windows)]
    {
        let raw = path.as_os_str().to_string_lossy();
        if let Some(rest) = raw.strip_prefix(r"\\?\")
            && !rest.starts_with("UNC\\")
        {
            return PathBuf::from(rest);
        }
    }
    path
}

fn normalize_syntactic(path: &Path) -> PathBuf {
    let mut components = Vec::new();
    for component in path.components() {
        match component {
            Component::Prefix(..) | Component::RootDir | Component::Normal(_) => {
                components.push(component);
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if let Some(Component::Normal(_)) = components.last() {
                    components.pop();
                }
            }
        }
    }
    components.into_iter().collect()
}
