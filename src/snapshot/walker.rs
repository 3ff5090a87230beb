//! Lazy tree walker producing a root-relative inventory of a package.
//!
//! At each directory level the walker yields every file first, then the
//! directory itself (never the supplied root), then descends into each
//! subdirectory. Subdirectories are visited in the order the filesystem
//! enumerates them, which differs across platforms; callers needing a stable
//! order must sort.
//!
//! Traversal uses an explicit work stack, so nesting depth is bounded by
//! memory rather than by the thread's call stack.

#![allow(missing_docs)]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::errors::Result;
use crate::core::paths::portable;
use crate::snapshot::fs::PackageFs;
use crate::snapshot::glob::Glob;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    File,
    Directory,
}

/// One entry of a tree listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryItem {
    /// Path relative to the walked root, native separators.
    pub path: PathBuf,
    pub kind: ItemKind,
    /// Nesting level; the root's direct children are at depth 1.
    pub depth: usize,
    /// Files directly inside a directory; always 0 for files.
    pub child_count: usize,
}

impl DirectoryItem {
    /// Relative path with `/` separators.
    #[must_use]
    pub fn portable_path(&self) -> String {
        portable(&self.path)
    }

    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.kind == ItemKind::Directory
    }
}

/// Entry point for listing a tree through a [`PackageFs`].
pub struct TreeWalker<'a> {
    fs: &'a dyn PackageFs,
}

impl<'a> TreeWalker<'a> {
    #[must_use]
    pub fn new(fs: &'a dyn PackageFs) -> Self {
        Self { fs }
    }

    /// Lazily list everything under `root`. A missing root yields nothing.
    #[must_use]
    pub fn list(&self, root: &Path) -> DirectoryItems<'a> {
        DirectoryItems {
            fs: self.fs,
            root: root.to_path_buf(),
            stack: Vec::new(),
            ready: VecDeque::new(),
            state: WalkState::Unstarted,
        }
    }

    /// Files whose root-relative portable path matches `pattern`, as full paths.
    pub fn find_files(&self, root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
        let glob = Glob::new(pattern)?;
        let mut matches = Vec::new();
        for item in self.list(root) {
            let item = item?;
            if !item.is_dir() && glob.is_match(&item.portable_path()) {
                matches.push(root.join(&item.path));
            }
        }
        Ok(matches)
    }
}

/// Convenience wrapper around [`TreeWalker::find_files`].
pub fn find_files(fs: &dyn PackageFs, root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    TreeWalker::new(fs).find_files(root, pattern)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WalkState {
    Unstarted,
    Walking,
    Done,
}

/// Iterator returned by [`TreeWalker::list`].
///
/// The first error ends the walk: a partial listing would misreport which
/// entries exist.
pub struct DirectoryItems<'a> {
    fs: &'a dyn PackageFs,
    root: PathBuf,
    /// (absolute dir, depth of that dir); the root sits at depth 0.
    stack: Vec<(PathBuf, usize)>,
    ready: VecDeque<DirectoryItem>,
    state: WalkState,
}

impl DirectoryItems<'_> {
    fn relative(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.root).map_or_else(|_| path.to_path_buf(), Path::to_path_buf)
    }

    fn expand(&mut self, dir: &Path, depth: usize) -> Result<()> {
        let files = self.fs.list_files(dir)?;
        let file_count = files.len();
        for file in files {
            let path = self.relative(&file);
            self.ready.push_back(DirectoryItem {
                path,
                kind: ItemKind::File,
                depth: depth + 1,
                child_count: 0,
            });
        }
        if depth > 0 {
            let path = self.relative(dir);
            self.ready.push_back(DirectoryItem {
                path,
                kind: ItemKind::Directory,
                depth,
                child_count: file_count,
            });
        }
        let dirs = self.fs.list_dirs(dir)?;
        self.stack
            .extend(dirs.into_iter().rev().map(|sub| (sub, depth + 1)));
        Ok(())
    }
}

impl Iterator for DirectoryItems<'_> {
    type Item = Result<DirectoryItem>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.ready.pop_front() {
                return Some(Ok(item));
            }
            match self.state {
                WalkState::Done => return None,
                WalkState::Unstarted => {
                    self.state = WalkState::Walking;
                    match self.fs.exists(&self.root) {
                        Ok(true) => self.stack.push((self.root.clone(), 0)),
                        Ok(false) => {
                            self.state = WalkState::Done;
                            return None;
                        }
                        Err(err) => {
                            self.state = WalkState::Done;
                            return Some(Err(err));
                        }
                    }
                }
                WalkState::Walking => {
                    let Some((dir, depth)) = self.stack.pop() else {
                        self.state = WalkState::Done;
                        return None;
                    };
                    if let Err(err) = self.expand(&dir, depth) {
                        self.state = WalkState::Done;
                        self.ready.clear();
                        self.stack.clear();
                        return Some(Err(err));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::PvsError;
    use crate::snapshot::fs::StdFs;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, bytes: usize) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, vec![b'x'; bytes]).unwrap();
    }

    fn collect(root: &Path) -> Vec<DirectoryItem> {
        TreeWalker::new(&StdFs)
            .list(root)
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn missing_root_yields_nothing() {
        let tmp = TempDir::new().unwrap();
        assert!(collect(&tmp.path().join("absent")).is_empty());
    }

    #[test]
    fn files_precede_their_directory_entry() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.txt", 1);
        write(tmp.path(), "sub/c.txt", 1);
        write(tmp.path(), "sub/d.txt", 1);
        write(tmp.path(), "sub/deeper/e.txt", 1);

        let items = collect(tmp.path());
        let order: Vec<String> = items.iter().map(DirectoryItem::portable_path).collect();
        assert_eq!(order[0], "a.txt");

        let sub = order.iter().position(|p| p == "sub").unwrap();
        let c = order.iter().position(|p| p == "sub/c.txt").unwrap();
        let d = order.iter().position(|p| p == "sub/d.txt").unwrap();
        let deeper = order.iter().position(|p| p == "sub/deeper").unwrap();
        let e = order.iter().position(|p| p == "sub/deeper/e.txt").unwrap();
        assert!(c < sub && d < sub);
        assert!(sub < e && e < deeper);
        assert_eq!(items.len(), 6);
    }

    #[test]
    fn depth_and_child_count() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.txt", 1);
        write(tmp.path(), "sub/c.txt", 1);
        write(tmp.path(), "sub/d.txt", 1);
        fs::create_dir_all(tmp.path().join("sub/empty")).unwrap();

        let items = collect(tmp.path());
        let find = |p: &str| items.iter().find(|i| i.portable_path() == p).unwrap().clone();

        assert_eq!(find("a.txt").depth, 1);
        let sub = find("sub");
        assert_eq!((sub.depth, sub.kind, sub.child_count), (1, ItemKind::Directory, 2));
        assert_eq!(find("sub/c.txt").depth, 2);
        assert_eq!(find("sub/c.txt").child_count, 0);
        let empty = find("sub/empty");
        assert_eq!((empty.depth, empty.child_count), (2, 0));
    }

    #[test]
    fn root_is_never_emitted() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "only.txt", 3);
        let items = collect(tmp.path());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].path, PathBuf::from("only.txt"));
    }

    #[test]
    fn find_files_matches_relative_globs() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "Runtime/Foo.cs", 1);
        write(tmp.path(), "Runtime/Foo.cs.meta", 1);
        write(tmp.path(), "Editor/Bar.cs", 1);
        write(tmp.path(), "README.md", 1);

        let mut found = find_files(&StdFs, tmp.path(), "**/*.cs").unwrap();
        found.sort();
        assert_eq!(
            found,
            vec![tmp.path().join("Editor/Bar.cs"), tmp.path().join("Runtime/Foo.cs")]
        );
        assert!(find_files(&StdFs, &tmp.path().join("absent"), "*").unwrap().is_empty());
    }

    struct BrokenFs;

    impl PackageFs for BrokenFs {
        fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
            Err(PvsError::PermissionDenied {
                path: dir.to_path_buf(),
            })
        }
        fn list_dirs(&self, _dir: &Path) -> Result<Vec<PathBuf>> {
            Ok(Vec::new())
        }
        fn file_size(&self, _path: &Path) -> Result<u64> {
            Ok(0)
        }
        fn exists(&self, _path: &Path) -> Result<bool> {
            Ok(true)
        }
        fn is_dir(&self, _path: &Path) -> Result<bool> {
            Ok(true)
        }
    }

    #[test]
    fn read_failure_propagates_and_ends_walk() {
        let mut items = TreeWalker::new(&BrokenFs).list(Path::new("/pkg"));
        let first = items.next().unwrap();
        assert_eq!(first.unwrap_err().code(), "PVS-3001");
        assert!(items.next().is_none());
    }
}
