//! JSONL activity log: one self-contained JSON object per line.
//!
//! Lines are assembled in memory and written with a single `write_all` so a
//! concurrent `tail -f` never sees half a record.
//!
//! Degradation chain:
//! 1. Primary file path
//! 2. stderr with `[PVS-JSONL]` prefix
//! 3. Silent discard (validation must never fail because logging did)

#![allow(missing_docs)]

use std::fs::{self, File, OpenOptions, rename};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::core::errors::{PvsError, Result};
use crate::logger::ActivityLog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    ValidationStart,
    CheckComplete,
    DeltaReportWritten,
    ValidationComplete,
    Error,
}

/// A single JSONL record; everything past `severity` is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// RFC 3339 UTC timestamp, millisecond precision.
    pub ts: String,
    pub event: EventType,
    pub severity: Severity,
    /// `name@version` of the package under validation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check: Option<String>,
    /// Terminal check state or overall report status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warnings: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ok: Option<bool>,
    /// PVS error code when something failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl LogEntry {
    /// Create a new entry stamped with the current UTC time.
    pub fn new(event: EventType, severity: Severity) -> Self {
        Self {
            ts: format_utc_now(),
            event,
            severity,
            package: None,
            context: None,
            check: None,
            state: None,
            duration_ms: None,
            warnings: None,
            errors: None,
            path: None,
            ok: None,
            error_code: None,
            error_message: None,
            details: None,
        }
    }

    #[must_use]
    pub fn package(mut self, package: impl ToString) -> Self {
        self.package = Some(package.to_string());
        self
    }

    #[must_use]
    pub fn context(mut self, context: impl ToString) -> Self {
        self.context = Some(context.to_string());
        self
    }

    /// Attach the code and message of a failure.
    #[must_use]
    pub fn error(mut self, error: &PvsError) -> Self {
        self.ok = Some(false);
        self.error_code = Some(error.code().to_string());
        self.error_message = Some(error.to_string());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterState {
    Normal,
    Stderr,
    Discard,
}

#[derive(Debug, Clone)]
pub struct JsonlConfig {
    pub path: PathBuf,
    /// Rotate once the file would grow past this many bytes.
    pub max_size_bytes: u64,
    pub max_rotated_files: u32,
}

impl JsonlConfig {
    /// Settings from the `[logging]` and `[paths]` config sections.
    #[must_use]
    pub fn from_config(config: &crate::core::config::Config) -> Self {
        Self {
            path: config.paths.jsonl_log.clone(),
            max_size_bytes: config.logging.max_size_bytes,
            max_rotated_files: config.logging.max_rotated_files,
        }
    }
}

struct Inner {
    writer: Option<BufWriter<File>>,
    state: WriterState,
    bytes_written: u64,
}

/// Append-only JSONL log writer with size rotation. Safe to share across threads.
pub struct JsonlWriter {
    config: JsonlConfig,
    inner: Mutex<Inner>,
}

impl JsonlWriter {
    /// Open the log file, degrading to stderr if it cannot be opened.
    pub fn open(config: JsonlConfig) -> Self {
        let inner = match open_append(&config.path) {
            Ok((file, size)) => Inner {
                writer: Some(BufWriter::new(file)),
                state: WriterState::Normal,
                bytes_written: size,
            },
            Err(err) => {
                let _ = writeln!(
                    io::stderr(),
                    "[PVS-JSONL] cannot open {}: {err}; logging to stderr",
                    config.path.display()
                );
                Inner {
                    writer: None,
                    state: WriterState::Stderr,
                    bytes_written: 0,
                }
            }
        };
        Self {
            config,
            inner: Mutex::new(inner),
        }
    }

    /// Write a single log entry as one JSONL line.
    pub fn write_entry(&self, entry: &LogEntry) {
        let line = match serde_json::to_string(entry) {
            Ok(json) => format!("{json}\n"),
            Err(e) => {
                let _ = writeln!(io::stderr(), "[PVS-JSONL] serialize error: {e}");
                return;
            }
        };
        let mut inner = self.inner.lock();
        self.write_line(&mut inner, &line);
    }

    pub fn flush(&self) {
        if let Some(w) = self.inner.lock().writer.as_mut() {
            let _ = w.flush();
        }
    }

    /// Current degradation state.
    pub fn state(&self) -> &'static str {
        match self.inner.lock().state {
            WriterState::Normal => "normal",
            WriterState::Stderr => "stderr",
            WriterState::Discard => "discard",
        }
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    fn write_line(&self, inner: &mut Inner, line: &str) {
        if inner.state == WriterState::Normal
            && inner.bytes_written + line.len() as u64 > self.config.max_size_bytes
        {
            self.rotate(inner);
        }

        match inner.state {
            WriterState::Normal => {
                let written = inner
                    .writer
                    .as_mut()
                    .is_some_and(|w| w.write_all(line.as_bytes()).and_then(|()| w.flush()).is_ok());
                if written {
                    inner.bytes_written += line.len() as u64;
                } else {
                    degrade(inner);
                    self.write_line(inner, line);
                }
            }
            WriterState::Stderr => {
                if write!(io::stderr(), "[PVS-JSONL] {line}").is_err() {
                    degrade(inner);
                }
            }
            WriterState::Discard => {}
        }
    }

    fn rotate(&self, inner: &mut Inner) {
        if let Some(mut w) = inner.writer.take() {
            let _ = w.flush();
        }

        let base = &self.config.path;
        for i in (1..self.config.max_rotated_files).rev() {
            let _ = rename(rotated_name(base, i), rotated_name(base, i + 1));
        }
        if self.config.max_rotated_files == 0 {
            let _ = fs::remove_file(base);
        } else {
            let _ = rename(base, rotated_name(base, 1));
        }

        match open_append(base) {
            Ok((file, _)) => {
                inner.writer = Some(BufWriter::new(file));
                inner.bytes_written = 0;
            }
            Err(_) => degrade(inner),
        }
    }
}

impl ActivityLog for JsonlWriter {
    fn record(&self, entry: LogEntry) {
        self.write_entry(&entry);
    }
}

impl Drop for JsonlWriter {
    fn drop(&mut self) {
        self.flush();
    }
}

fn degrade(inner: &mut Inner) {
    inner.writer = None;
    inner.state = match inner.state {
        WriterState::Normal => {
            let _ = writeln!(io::stderr(), "[PVS-JSONL] log write failed, using stderr");
            WriterState::Stderr
        }
        WriterState::Stderr | WriterState::Discard => WriterState::Discard,
    };
}

/// Open or create a file for appending. Returns `(File, current_size)`.
fn open_append(path: &Path) -> Result<(File, u64)> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| PvsError::io(parent, source))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| PvsError::io(path, source))?;
    let size = file.metadata().map(|m| m.len()).unwrap_or(0);
    Ok((file, size))
}

/// `activity.jsonl` → `activity.jsonl.3`.
fn rotated_name(base: &Path, index: u32) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(format!(".{index}"));
    PathBuf::from(name)
}

fn format_utc_now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(path: PathBuf, max_size_bytes: u64) -> JsonlConfig {
        JsonlConfig {
            path,
            max_size_bytes,
            max_rotated_files: 2,
        }
    }

    fn lines(path: &Path) -> Vec<serde_json::Value> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn entries_are_separate_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("activity.jsonl");
        let writer = JsonlWriter::open(config(path.clone(), 1024 * 1024));

        writer.write_entry(
            &LogEntry::new(EventType::ValidationStart, Severity::Info)
                .package("com.pkg@1.0.0")
                .context("promotion"),
        );
        writer.record(LogEntry::new(EventType::ValidationComplete, Severity::Info));
        writer.flush();

        let parsed = lines(&path);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0]["event"], "validation_start");
        assert_eq!(parsed[0]["package"], "com.pkg@1.0.0");
        assert_eq!(parsed[0]["severity"], "info");
        assert_eq!(parsed[1]["event"], "validation_complete");
    }

    #[test]
    fn optional_fields_omitted_when_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sparse.jsonl");
        let writer = JsonlWriter::open(config(path.clone(), 1024 * 1024));
        writer.write_entry(&LogEntry::new(EventType::CheckComplete, Severity::Info));
        writer.flush();

        let line = fs::read_to_string(&path).unwrap();
        assert!(!line.contains("\"check\""));
        assert!(!line.contains("\"error_code\""));
    }

    #[test]
    fn error_entries_carry_code() {
        let entry = LogEntry::new(EventType::Error, Severity::Critical).error(&PvsError::Runtime {
            details: "boom".to_string(),
        });
        assert_eq!(entry.error_code.as_deref(), Some("PVS-3900"));
        assert_eq!(entry.ok, Some(false));
    }

    #[test]
    fn rotation_keeps_bounded_history() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rot.jsonl");
        let writer = JsonlWriter::open(config(path.clone(), 120));

        for _ in 0..10 {
            writer.write_entry(&LogEntry::new(EventType::CheckComplete, Severity::Info));
        }
        writer.flush();

        assert!(path.exists());
        assert!(rotated_name(&path, 1).exists());
        assert!(!rotated_name(&path, 3).exists());
        assert_eq!(writer.state(), "normal");
    }

    #[test]
    fn unwritable_path_degrades_to_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "not a dir").unwrap();
        let writer = JsonlWriter::open(config(blocker.join("activity.jsonl"), 1024));
        assert_eq!(writer.state(), "stderr");
        writer.write_entry(&LogEntry::new(EventType::Error, Severity::Warning));
    }
}
