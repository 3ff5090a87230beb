//! Shell-style glob patterns over `/`-separated relative paths.

use regex::Regex;

use crate::core::errors::{PvsError, Result};

/// Compiled glob supporting `*`, `**`, and `?`.
///
/// `*` and `?` never cross a `/`; `**/` matches zero or more whole directories.
#[derive(Debug, Clone)]
pub struct Glob {
    pattern: String,
    regex: Regex,
}

impl Glob {
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self {
            pattern: pattern.to_string(),
            regex: glob_to_regex(pattern)?,
        })
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Match a relative path; backslashes are treated as separators.
    #[must_use]
    pub fn is_match(&self, relative: &str) -> bool {
        if relative.contains('\\') {
            return self.regex.is_match(&relative.replace('\\', "/"));
        }
        self.regex.is_match(relative)
    }
}

fn glob_to_regex(pattern: &str) -> Result<Regex> {
    let normalized = pattern.replace('\\', "/");
    if normalized.is_empty() {
        return Err(malformed(pattern, "pattern is empty"));
    }
    if normalized.starts_with('/') {
        return Err(malformed(pattern, "patterns match relative paths"));
    }
    let mut regex_str = String::with_capacity(normalized.len() * 2);
    regex_str.push('^');

    let chars: Vec<char> = normalized.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' if chars.get(i + 1) == Some(&'*') => {
                let starts_segment = i == 0 || chars[i - 1] == '/';
                let ends_segment = matches!(chars.get(i + 2), None | Some('/'));
                if !(starts_segment && ends_segment) {
                    return Err(malformed(pattern, "`**` must be a whole path segment"));
                }
                if chars.get(i + 2) == Some(&'/') {
                    regex_str.push_str("(?:.*/)?");
                    i += 3;
                } else {
                    regex_str.push_str(".*");
                    i += 2;
                }
            }
            '*' => {
                regex_str.push_str("[^/]*");
                i += 1;
            }
            '?' => {
                regex_str.push_str("[^/]");
                i += 1;
            }
            c => {
                regex_str.push_str(&regex::escape(&c.to_string()));
                i += 1;
            }
        }
    }
    regex_str.push('$');

    Regex::new(&regex_str).map_err(|err| malformed(pattern, &err.to_string()))
}

fn malformed(pattern: &str, reason: &str) -> PvsError {
    PvsError::InvalidConfig {
        details: format!("invalid glob pattern {pattern:?}: {reason}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_star_stays_in_one_segment() {
        let glob = Glob::new("*.cs").unwrap();
        assert!(glob.is_match("Foo.cs"));
        assert!(!glob.is_match("Runtime/Foo.cs"));
    }

    #[test]
    fn double_star_crosses_directories() {
        let glob = Glob::new("**/*.meta").unwrap();
        assert!(glob.is_match("a.meta"));
        assert!(glob.is_match("Runtime/Scripts/a.meta"));
        assert!(!glob.is_match("Runtime/a.metadata"));

        let tail = Glob::new("Documentation~/**").unwrap();
        assert!(tail.is_match("Documentation~/images/shot.png"));
    }

    #[test]
    fn question_mark_and_literals() {
        let glob = Glob::new("v?.(old)").unwrap();
        assert!(glob.is_match("v1.(old)"));
        assert!(!glob.is_match("v12.(old)"));
        assert!(!glob.is_match("v1x(old)"));
    }

    #[test]
    fn malformed_patterns_are_rejected() {
        for pattern in ["", "/abs/*.cs", "src**", "**.cs", "a/***/b", "Runtime/x**y"] {
            let err = Glob::new(pattern).unwrap_err();
            assert_eq!(err.code(), "PVS-1001", "{pattern:?}");
            assert!(err.to_string().contains("invalid glob pattern"), "{pattern:?}");
        }
    }

    #[test]
    fn lone_double_star_matches_everything() {
        let glob = Glob::new("**").unwrap();
        assert!(glob.is_match("a"));
        assert!(glob.is_match("a/b/c.txt"));
    }

    #[test]
    fn backslash_paths_are_normalized() {
        let glob = Glob::new("Editor/*.asmdef").unwrap();
        assert!(glob.is_match("Editor\\Pkg.Editor.asmdef"));
        assert_eq!(glob.pattern(), "Editor/*.asmdef");
    }
}
