//! Check registry, isolated runner, aggregated reports, and the suite facade.

pub mod check;
pub mod context;
pub mod outcome;
pub mod registry;
pub mod report;
pub mod runner;
pub mod store;
pub mod suite;
