//! Validation contexts and check categories.

#![allow(missing_docs)]

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::errors::PvsError;

/// The mode a package is being validated under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum ValidationContext {
    /// Structural checks only.
    Structure,
    AssetStore,
    LocalDevelopment,
    LocalDevelopmentInternal,
    /// Promotion of a release candidate to production.
    Promotion,
}

impl ValidationContext {
    pub const ALL: [Self; 5] = [
        Self::Structure,
        Self::AssetStore,
        Self::LocalDevelopment,
        Self::LocalDevelopmentInternal,
        Self::Promotion,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Structure => "structure",
            Self::AssetStore => "asset-store",
            Self::LocalDevelopment => "local-development",
            Self::LocalDevelopmentInternal => "local-development-internal",
            Self::Promotion => "promotion",
        }
    }
}

impl fmt::Display for ValidationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationContext {
    type Err = PvsError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|context| context.as_str() == wanted)
            .ok_or_else(|| PvsError::UnknownContext {
                value: raw.to_string(),
            })
    }
}

/// Grouping tag shown next to each check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckCategory {
    DataValidation,
    ContentScan,
    Structure,
    ApiValidation,
}

impl fmt::Display for CheckCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::DataValidation => "data-validation",
            Self::ContentScan => "content-scan",
            Self::Structure => "structure",
            Self::ApiValidation => "api-validation",
        })
    }
}
