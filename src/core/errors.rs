//! PVS-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, PvsError>;

/// Top-level error type for the package validation suite.
#[derive(Debug, Error)]
pub enum PvsError {
    #[error("[PVS-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[PVS-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[PVS-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[PVS-1101] invalid package manifest at {path}: {details}")]
    InvalidManifest { path: PathBuf, details: String },

    #[error("[PVS-1102] invalid package id: {details}")]
    InvalidPackageId { details: String },

    #[error("[PVS-1201] check already registered: {id}")]
    DuplicateCheck { id: String },

    #[error("[PVS-1202] unknown validation context: {value}")]
    UnknownContext { value: String },

    #[error("[PVS-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[PVS-3001] permission denied for {path}")]
    PermissionDenied { path: PathBuf },

    #[error("[PVS-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[PVS-3900] runtime failure: {details}")]
    Runtime { details: String },
}

impl PvsError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "PVS-1001",
            Self::MissingConfig { .. } => "PVS-1002",
            Self::ConfigParse { .. } => "PVS-1003",
            Self::InvalidManifest { .. } => "PVS-1101",
            Self::InvalidPackageId { .. } => "PVS-1102",
            Self::DuplicateCheck { .. } => "PVS-1201",
            Self::UnknownContext { .. } => "PVS-1202",
            Self::Serialization { .. } => "PVS-2101",
            Self::PermissionDenied { .. } => "PVS-3001",
            Self::Io { .. } => "PVS-3002",
            Self::Runtime { .. } => "PVS-3900",
        }
    }

    /// Convenience constructor for IO errors with a known path.
    ///
    /// Permission failures are classified separately so callers can tell an
    /// unreadable subtree apart from a vanished one.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        if source.kind() == std::io::ErrorKind::PermissionDenied {
            return Self::PermissionDenied { path };
        }
        Self::Io { path, source }
    }
}

impl From<serde_json::Error> for PvsError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for PvsError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}

impl From<toml::ser::Error> for PvsError {
    fn from(value: toml::ser::Error) -> Self {
        Self::Serialization {
            context: "toml",
            details: value.to_string(),
        }
    }
}
