//! Core types: errors, configuration, manifests, path helpers.

pub mod config;
pub mod errors;
pub mod manifest;
pub mod paths;
