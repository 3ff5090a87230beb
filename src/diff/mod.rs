//! Version-to-version package comparison and the `.delta` report.

pub mod engine;
pub mod report;
