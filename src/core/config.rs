//! Configuration system: TOML file + env var overrides + smart defaults.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{PvsError, Result};
use crate::validation::context::ValidationContext;

/// Full PVS configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub validation: ValidationConfig,
    pub diff: DiffConfig,
    pub logging: LoggingConfig,
    pub paths: PathsConfig,
}

/// Check selection and runner knobs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ValidationConfig {
    /// Context used when the caller does not request one.
    pub default_context: ValidationContext,
    /// Upper bound on checks executing at the same time.
    pub parallelism: usize,
    /// Write each completed report as JSON under `paths.results_dir`.
    pub persist_reports: bool,
}

/// Delta-report behavior.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DiffConfig {
    /// When false the diff check still classifies but skips the `.delta` write.
    pub write_delta_reports: bool,
}

/// JSONL activity log tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    pub max_size_bytes: u64,
    pub max_rotated_files: u32,
}

/// Filesystem paths used by pvs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    pub config_file: PathBuf,
    pub results_dir: PathBuf,
    pub jsonl_log: PathBuf,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            default_context: ValidationContext::LocalDevelopment,
            parallelism: std::thread::available_parallelism()
                .map_or(2, |n| n.get().saturating_div(2).max(1)),
            persist_reports: true,
        }
    }
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            write_delta_reports: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_size_bytes: 16 * 1024 * 1024,
            max_rotated_files: 3,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        let home_dir = env::var_os("HOME").map_or_else(
            || {
                eprintln!(
                    "[PVS-CONFIG] WARNING: HOME not set, falling back to /tmp for data paths"
                );
                PathBuf::from("/tmp")
            },
            PathBuf::from,
        );
        let cfg = home_dir.join(".config").join("pvs").join("config.toml");
        let data = home_dir.join(".local").join("share").join("pvs");
        Self {
            config_file: cfg,
            results_dir: data.join("results"),
            jsonl_log: data.join("activity.jsonl"),
        }
    }
}

impl Config {
    /// Default configuration path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        PathsConfig::default().config_file
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// Missing config file is not an error when loading from default path; defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);
        let is_explicit_path = path.is_some();

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf).map_err(|source| PvsError::io(&path_buf, source))?;
            let parsed: Self = toml::from_str(&raw)?;
            parsed
        } else if is_explicit_path {
            return Err(PvsError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.paths.config_file = path_buf;
        cfg.apply_env_overrides_from(env_var)?;
        cfg.normalize_paths();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Effective configuration rendered as TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Deterministic hash of the effective config for activity logs.
    ///
    /// FNV-1a over the canonical JSON form, stable across processes.
    pub fn stable_hash(&self) -> Result<String> {
        let canonical = serde_json::to_string(self)?;
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in canonical.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        Ok(format!("{hash:016x}"))
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("PVS_VALIDATION_DEFAULT_CONTEXT") {
            self.validation.default_context =
                raw.parse().map_err(|error: PvsError| PvsError::ConfigParse {
                    context: "env",
                    details: format!("PVS_VALIDATION_DEFAULT_CONTEXT={raw:?}: {error}"),
                })?;
        }
        if let Some(raw) = lookup("PVS_VALIDATION_PARALLELISM") {
            self.validation.parallelism = parse_env_usize("PVS_VALIDATION_PARALLELISM", &raw)?;
        }
        if let Some(raw) = lookup("PVS_VALIDATION_PERSIST_REPORTS") {
            self.validation.persist_reports =
                parse_env_bool("PVS_VALIDATION_PERSIST_REPORTS", &raw)?;
        }
        if let Some(raw) = lookup("PVS_DIFF_WRITE_DELTA_REPORTS") {
            self.diff.write_delta_reports = parse_env_bool("PVS_DIFF_WRITE_DELTA_REPORTS", &raw)?;
        }
        if let Some(raw) = lookup("PVS_LOGGING_ENABLED") {
            self.logging.enabled = parse_env_bool("PVS_LOGGING_ENABLED", &raw)?;
        }
        if let Some(raw) = lookup("PVS_PATHS_RESULTS_DIR") {
            self.paths.results_dir = PathBuf::from(raw);
        }
        if let Some(raw) = lookup("PVS_PATHS_JSONL_LOG") {
            self.paths.jsonl_log = PathBuf::from(raw);
        }
        Ok(())
    }

    /// Strip trailing slashes so report paths compare consistently.
    fn normalize_paths(&mut self) {
        for path in [&mut self.paths.results_dir, &mut self.paths.jsonl_log] {
            let s = path.to_string_lossy();
            if s.len() > 1
                && let Some(stripped) = s.strip_suffix('/')
            {
                *path = PathBuf::from(stripped);
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.validation.parallelism == 0 {
            return Err(PvsError::InvalidConfig {
                details: "validation.parallelism must be >= 1".to_string(),
            });
        }
        if self.logging.enabled && self.logging.max_size_bytes == 0 {
            return Err(PvsError::InvalidConfig {
                details: "logging.max_size_bytes must be > 0 when logging is enabled".to_string(),
            });
        }
        if self.paths.results_dir.as_os_str().is_empty() {
            return Err(PvsError::InvalidConfig {
                details: "paths.results_dir must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}

fn parse_env_usize(name: &str, raw: &str) -> Result<usize> {
    raw.parse::<usize>().map_err(|error| PvsError::ConfigParse {
        context: "env",
        details: format!("{name}={raw:?}: {error}"),
    })
}

fn parse_env_bool(name: &str, raw: &str) -> Result<bool> {
    raw.parse::<bool>().map_err(|error| PvsError::ConfigParse {
        context: "env",
        details: format!("{name}={raw:?}: {error}"),
    })
}
