//! Ordered registry of checks, populated explicitly at startup.

#![allow(missing_docs)]

use std::sync::Arc;

use crate::checks::diff_evaluation::DiffEvaluation;
use crate::core::errors::{PvsError, Result};
use crate::validation::check::{Check, CheckDescriptor};
use crate::validation::context::ValidationContext;

/// Checks in registration order; ids are unique.
#[derive(Default, Clone)]
pub struct CheckRegistry {
    checks: Vec<Arc<dyn Check>>,
}

impl CheckRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every check shipped with this crate.
    #[must_use]
    pub fn with_builtin_checks() -> Self {
        let mut registry = Self::new();
        registry.checks.push(Arc::new(DiffEvaluation::new()));
        registry
    }

    pub fn register<C: Check + 'static>(&mut self, check: C) -> Result<()> {
        self.register_shared(Arc::new(check))
    }

    pub fn register_shared(&mut self, check: Arc<dyn Check>) -> Result<()> {
        let id = &check.descriptor().id;
        if self.get(id).is_some() {
            return Err(PvsError::DuplicateCheck { id: id.clone() });
        }
        self.checks.push(check);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Arc<dyn Check>> {
        self.checks.iter().find(|check| check.descriptor().id == id)
    }

    /// Checks supporting `context`, in registration order.
    #[must_use]
    pub fn select(&self, context: ValidationContext) -> Vec<Arc<dyn Check>> {
        self.checks
            .iter()
            .filter(|check| check.descriptor().supports(context))
            .cloned()
            .collect()
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &CheckDescriptor> {
        self.checks.iter().map(|check| check.descriptor())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

impl std::fmt::Debug for CheckRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.descriptors().map(|descriptor| &descriptor.id))
            .finish()
    }
}
