//! Checks shipped with the suite.

pub mod diff_evaluation;
