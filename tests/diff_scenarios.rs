//! Diff engine scenarios against real directory trees.

mod common;

use std::fs;

use package_validation_suite::prelude::*;
use tempfile::TempDir;

use common::{write_file, write_package};

fn relatives(entries: &[DiffEntry]) -> Vec<&str> {
    entries.iter().map(|entry| entry.relative.as_str()).collect()
}

#[test]
fn classifies_added_removed_and_modified() {
    let tmp = TempDir::new().expect("tempdir");
    let old = tmp.path().join("old");
    let new = tmp.path().join("new");
    write_file(&old, "a.txt", 10);
    write_file(&old, "b.txt", 5);
    write_file(&old, "sub/c.txt", 3);
    write_file(&new, "a.txt", 10);
    write_file(&new, "b.txt", 7);
    write_file(&new, "sub/d.txt", 3);

    let result = DiffEngine::new(&StdFs)
        .compare(Some(&old), Some(&new))
        .expect("compare");

    assert_eq!(relatives(&result.added), vec!["sub/d.txt"]);
    assert_eq!(relatives(&result.removed), vec!["sub/c.txt"]);
    assert_eq!(relatives(&result.modified), vec!["b.txt"]);
    assert_eq!(result.added[0].path, new.join("sub").join("d.txt"));
    assert_eq!(result.removed[0].path, old.join("sub").join("c.txt"));
    assert_eq!(
        result.tree,
        "    a.txt\n    b.txt  (MODIFIED)\n    <sub>\n        c.txt  --REMOVED--\n        d.txt  ++ADDED++\n"
    );
}

#[test]
fn identical_trees_have_no_changes() {
    let tmp = TempDir::new().expect("tempdir");
    let old = tmp.path().join("old");
    let new = tmp.path().join("new");
    for root in [&old, &new] {
        write_file(root, "Runtime/Foo.cs", 40);
        write_file(root, "Editor/Bar.cs", 12);
        write_file(root, "README.md", 3);
    }

    let result = DiffEngine::new(&StdFs)
        .compare(Some(&old), Some(&new))
        .expect("compare");
    assert!(!result.has_changes());
    assert!(!result.tree.contains("++ADDED++"));
    assert!(!result.tree.contains("--REMOVED--"));
    assert!(!result.tree.contains("(MODIFIED)"));
}

#[test]
fn same_size_content_change_is_not_modified() {
    let tmp = TempDir::new().expect("tempdir");
    let old = tmp.path().join("old");
    let new = tmp.path().join("new");
    fs::create_dir_all(&old).expect("old root");
    fs::create_dir_all(&new).expect("new root");
    fs::write(old.join("x.txt"), b"abcd").expect("write old");
    fs::write(new.join("x.txt"), b"wxyz").expect("write new");

    let result = DiffEngine::new(&StdFs)
        .compare(Some(&old), Some(&new))
        .expect("compare");
    assert!(result.modified.is_empty());
    assert_eq!(result.tree, "    x.txt\n");
}

#[test]
fn removed_directory_reports_every_file_beneath_it() {
    let tmp = TempDir::new().expect("tempdir");
    let old = tmp.path().join("old");
    let new = tmp.path().join("new");
    write_file(&old, "keep.txt", 1);
    write_file(&old, "gone/one.txt", 1);
    write_file(&old, "gone/deeper/two.txt", 1);
    write_file(&new, "keep.txt", 1);

    let result = DiffEngine::new(&StdFs)
        .compare(Some(&old), Some(&new))
        .expect("compare");
    assert_eq!(
        relatives(&result.removed),
        vec!["gone/one.txt", "gone/deeper/two.txt"]
    );
    assert!(result.tree.contains("    <gone>  --REMOVED--\n"));
    assert!(result.tree.contains("            two.txt  --REMOVED--\n"));
}

#[test]
fn absent_old_side_marks_everything_added() {
    let tmp = TempDir::new().expect("tempdir");
    let new = tmp.path().join("new");
    write_file(&new, "a.txt", 1);
    write_file(&new, "lib/b.txt", 1);

    let result = DiffEngine::new(&StdFs)
        .compare(None, Some(&new))
        .expect("compare");
    assert_eq!(relatives(&result.added), vec!["a.txt", "lib/b.txt"]);
    assert!(result.removed.is_empty());
}

#[test]
fn written_delta_report_matches_render() {
    let tmp = TempDir::new().expect("tempdir");
    let old = tmp.path().join("old");
    let new = tmp.path().join("new");
    let out = tmp.path().join("out");
    write_package(&old, "com.example.pkg", "1.0.0", &[("a.txt", 1)]);
    write_package(&new, "com.example.pkg", "2.0.0", &[("a.txt", 2)]);

    let previous = DirectoryManifestProvider::read(&old).expect("old manifest");
    let current = DirectoryManifestProvider::read(&new).expect("new manifest");
    let result = DiffEngine::new(&StdFs)
        .compare_packages(&previous, &current)
        .expect("compare");

    let path = write_delta_report(&out, &current, &previous, &result).expect("write delta");
    assert_eq!(path, out.join("com.example.pkg@2.0.0.delta"));
    let written = fs::read_to_string(&path).expect("read delta");
    assert_eq!(written, render_delta_report(&current, &previous, &result));
    assert!(written.ends_with("<com.example.pkg>\n    a.txt  (MODIFIED)\n    package.json\n"));
}
