//! Validation facade: select, run, aggregate, store.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;

use crate::checks::diff_evaluation;
use crate::core::config::Config;
use crate::core::errors::Result;
use crate::core::manifest::{ManifestProvider, PackageId, PackageSnapshot};
use crate::logger::ActivityLog;
use crate::logger::jsonl::{EventType, LogEntry, Severity as LogSeverity};
use crate::snapshot::fs::{PackageFs, StdFs};
use crate::validation::check::{Check, CheckContext};
use crate::validation::context::ValidationContext;
use crate::validation::outcome::{CheckOutcome, CheckState, Severity};
use crate::validation::registry::CheckRegistry;
use crate::validation::report::{ReportStatus, ValidationReport};
use crate::validation::runner::CheckRunner;
use crate::validation::store::ReportStore;

/// Owns the registry, runner, and report store for a session.
pub struct ValidationSuite {
    registry: CheckRegistry,
    runner: CheckRunner,
    store: ReportStore,
    fs: Arc<dyn PackageFs>,
    results_dir: PathBuf,
    write_delta_reports: bool,
    log: Option<Arc<dyn ActivityLog>>,
}

impl ValidationSuite {
    /// Suite over the host filesystem with a single worker and an in-memory store.
    pub fn new(registry: CheckRegistry, results_dir: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            runner: CheckRunner::default(),
            store: ReportStore::in_memory(),
            fs: Arc::new(StdFs),
            results_dir: results_dir.into(),
            write_delta_reports: true,
            log: None,
        }
    }

    /// Built-in checks with runner, store, and delta settings taken from `config`.
    pub fn from_config(config: &Config) -> Self {
        let results_dir = config.paths.results_dir.clone();
        Self {
            registry: CheckRegistry::with_builtin_checks(),
            runner: CheckRunner::new(config.validation.parallelism),
            store: ReportStore::at(&results_dir, config.validation.persist_reports),
            fs: Arc::new(StdFs),
            results_dir,
            write_delta_reports: config.diff.write_delta_reports,
            log: None,
        }
    }

    #[must_use]
    pub fn with_runner(mut self, runner: CheckRunner) -> Self {
        self.runner = runner;
        self
    }

    #[must_use]
    pub fn with_store(mut self, store: ReportStore) -> Self {
        self.store = store;
        self
    }

    #[must_use]
    pub fn with_fs(mut self, fs: Arc<dyn PackageFs>) -> Self {
        self.fs = fs;
        self
    }

    #[must_use]
    pub fn with_delta_reports(mut self, enabled: bool) -> Self {
        self.write_delta_reports = enabled;
        self
    }

    #[must_use]
    pub fn with_activity_log(mut self, log: Arc<dyn ActivityLog>) -> Self {
        self.log = Some(log);
        self
    }

    pub fn register<C: Check + 'static>(&mut self, check: C) -> Result<()> {
        self.registry.register(check)
    }

    #[must_use]
    pub fn registry(&self) -> &CheckRegistry {
        &self.registry
    }

    #[must_use]
    pub fn store(&self) -> &ReportStore {
        &self.store
    }

    #[must_use]
    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    /// Completed report for a package version, if one exists.
    pub fn report(&self, id: &PackageId) -> Result<Option<ValidationReport>> {
        self.store.get(id)
    }

    /// Resolve manifests through `provider`, then validate.
    pub fn validate_package(
        &self,
        provider: &dyn ManifestProvider,
        context: ValidationContext,
    ) -> Result<ValidationReport> {
        let snapshot = provider.snapshot().inspect_err(|err| {
            self.emit(LogEntry::new(EventType::Error, LogSeverity::Critical).error(err));
        })?;
        self.validate(&snapshot, context)
    }

    /// Run every check supporting `context` and store the aggregated report.
    ///
    /// Check failures never surface here; only storing the report can fail.
    pub fn validate(
        &self,
        snapshot: &PackageSnapshot,
        context: ValidationContext,
    ) -> Result<ValidationReport> {
        let id = snapshot.id();
        let started_at = Utc::now();
        let started = Instant::now();
        let selected = self.registry.select(context);

        let mut start = LogEntry::new(EventType::ValidationStart, LogSeverity::Info)
            .package(&id)
            .context(context);
        start.details = Some(format!("{} checks selected", selected.len()));
        self.emit(start);

        let ctx = CheckContext {
            snapshot,
            context,
            fs: self.fs.as_ref(),
            results_dir: &self.results_dir,
            write_delta_reports: self.write_delta_reports,
        };
        let outcomes = self
            .runner
            .run_with(&selected, &ctx, &|outcome| self.log_outcome(&id, outcome));

        let report = ValidationReport {
            package_id: id.clone(),
            name: snapshot.current.name().to_string(),
            version: snapshot.current.version().to_string(),
            context,
            started_at,
            elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            outcomes,
        };

        if self.write_delta_reports
            && let Some(outcome) = report.outcome(diff_evaluation::ID)
            && outcome.state == CheckState::Succeeded
        {
            let mut entry = LogEntry::new(EventType::DeltaReportWritten, LogSeverity::Info).package(&id);
            entry.path = Some(
                self.results_dir
                    .join(id.delta_file_name())
                    .display()
                    .to_string(),
            );
            self.emit(entry);
        }

        let status = report.status();
        let mut done = LogEntry::new(
            EventType::ValidationComplete,
            if status == ReportStatus::Failed {
                LogSeverity::Warning
            } else {
                LogSeverity::Info
            },
        )
        .package(&id)
        .context(context);
        done.state = Some(status.to_string());
        done.duration_ms = Some(report.elapsed_ms);
        done.ok = Some(report.succeeded());
        self.emit(done);

        self.store.insert(report.clone()).inspect_err(|err| {
            self.emit(
                LogEntry::new(EventType::Error, LogSeverity::Critical)
                    .package(&id)
                    .error(err),
            );
        })?;
        Ok(report)
    }

    fn log_outcome(&self, id: &PackageId, outcome: &CheckOutcome) {
        let severity = match outcome.state {
            CheckState::Failed => LogSeverity::Warning,
            CheckState::Succeeded | CheckState::NotRun => LogSeverity::Info,
        };
        let mut entry = LogEntry::new(EventType::CheckComplete, severity).package(id);
        entry.check = Some(outcome.id.clone());
        entry.state = Some(outcome.state.to_string());
        entry.duration_ms = Some(outcome.elapsed_ms);
        entry.warnings = Some(outcome.count(Severity::Warning));
        entry.errors = Some(outcome.count(Severity::Error));
        self.emit(entry);
    }

    fn emit(&self, entry: LogEntry) {
        if let Some(log) = &self.log {
            log.record(entry);
        }
    }
}
