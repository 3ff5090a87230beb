//! End-to-end suite runs: context selection and per-check failure isolation.

mod common;

use std::sync::Arc;

use package_validation_suite::logger::MemoryLog;
use package_validation_suite::logger::jsonl::EventType;
use package_validation_suite::prelude::*;
use tempfile::TempDir;

use common::write_package;

enum Behavior {
    Pass,
    Warn,
    Reject,
    Error,
    Panic,
}

struct Probe {
    descriptor: CheckDescriptor,
    behavior: Behavior,
}

impl Probe {
    fn new(id: &str, behavior: Behavior, contexts: &[ValidationContext]) -> Self {
        Self {
            descriptor: CheckDescriptor::new(
                id,
                format!("Probe {id}"),
                CheckCategory::Structure,
                "test probe",
                contexts,
            ),
            behavior,
        }
    }
}

impl Check for Probe {
    fn descriptor(&self) -> &CheckDescriptor {
        &self.descriptor
    }

    fn run(&self, _ctx: &CheckContext<'_>) -> package_validation_suite::core::errors::Result<CheckVerdict> {
        let mut recorder = MessageRecorder::new();
        match self.behavior {
            Behavior::Pass => recorder.info("all good"),
            Behavior::Warn => recorder.warn("looks odd"),
            Behavior::Reject => recorder.error("rule violated"),
            Behavior::Error => {
                return Err(PvsError::Runtime {
                    details: "probe backend unavailable".to_string(),
                });
            }
            Behavior::Panic => panic!("probe exploded"),
        }
        Ok(recorder.finish())
    }
}

const ALL: &[ValidationContext] = &ValidationContext::ALL;

fn package(tmp: &TempDir, with_previous: bool) -> PackageSnapshot {
    let new = tmp.path().join("new");
    write_package(&new, "com.example.pkg", "1.1.0", &[("a.txt", 4)]);
    let current = DirectoryManifestProvider::read(&new).expect("current manifest");
    let previous = with_previous.then(|| {
        let old = tmp.path().join("old");
        write_package(&old, "com.example.pkg", "1.0.0", &[("a.txt", 3)]);
        DirectoryManifestProvider::read(&old).expect("previous manifest")
    });
    PackageSnapshot::new(current, previous)
}

fn suite(tmp: &TempDir, probes: Vec<Probe>) -> ValidationSuite {
    let mut registry = CheckRegistry::new();
    for probe in probes {
        registry.register(probe).expect("register probe");
    }
    ValidationSuite::new(registry, tmp.path().join("results"))
        .with_store(ReportStore::in_memory())
        .with_runner(CheckRunner::new(4))
}

#[test]
fn one_failing_check_does_not_stop_the_others() {
    let tmp = TempDir::new().expect("tempdir");
    let suite = suite(
        &tmp,
        vec![
            Probe::new("a-pass", Behavior::Pass, ALL),
            Probe::new("b-panic", Behavior::Panic, ALL),
            Probe::new("c-error", Behavior::Error, ALL),
            Probe::new("d-pass", Behavior::Pass, ALL),
        ],
    );
    let report = suite
        .validate(&package(&tmp, false), ValidationContext::Promotion)
        .expect("validate");

    assert_eq!(report.outcomes.len(), 4);
    assert_eq!(report.outcome("a-pass").map(|o| o.state), Some(CheckState::Succeeded));
    assert_eq!(report.outcome("d-pass").map(|o| o.state), Some(CheckState::Succeeded));

    let panicked = report.outcome("b-panic").expect("panic outcome");
    assert_eq!(panicked.state, CheckState::Failed);
    assert!(panicked.messages.iter().any(|m| m.text.contains("probe exploded")));

    let errored = report.outcome("c-error").expect("error outcome");
    assert_eq!(errored.state, CheckState::Failed);
    assert!(
        errored
            .messages
            .iter()
            .any(|m| m.severity == Severity::Error && m.text.contains("probe backend unavailable"))
    );

    assert!(!report.succeeded());
    assert_eq!(report.status(), ReportStatus::Failed);
}

#[test]
fn outcomes_follow_registration_order_under_parallelism() {
    let tmp = TempDir::new().expect("tempdir");
    let ids: Vec<String> = (0..12).map(|i| format!("probe-{i:02}")).collect();
    let probes = ids
        .iter()
        .map(|id| Probe::new(id, Behavior::Pass, ALL))
        .collect();
    let report = suite(&tmp, probes)
        .validate(&package(&tmp, false), ValidationContext::Structure)
        .expect("validate");
    let seen: Vec<&str> = report.outcomes.iter().map(|o| o.id.as_str()).collect();
    assert_eq!(seen, ids.iter().map(String::as_str).collect::<Vec<_>>());
}

#[test]
fn only_checks_supporting_the_context_run() {
    let tmp = TempDir::new().expect("tempdir");
    let suite = suite(
        &tmp,
        vec![
            Probe::new(
                "structure-and-promotion",
                Behavior::Pass,
                &[ValidationContext::Structure, ValidationContext::Promotion],
            ),
            Probe::new("promotion-only", Behavior::Pass, &[ValidationContext::Promotion]),
        ],
    );
    let snapshot = package(&tmp, false);

    let structure = suite
        .validate(&snapshot, ValidationContext::Structure)
        .expect("structure run");
    let ids: Vec<&str> = structure.outcomes.iter().map(|o| o.id.as_str()).collect();
    assert_eq!(ids, vec!["structure-and-promotion"]);

    let promotion = suite
        .validate(&snapshot, ValidationContext::Promotion)
        .expect("promotion run");
    assert_eq!(promotion.outcomes.len(), 2);

    let asset_store = suite
        .validate(&snapshot, ValidationContext::AssetStore)
        .expect("asset store run");
    assert!(asset_store.outcomes.is_empty());
    assert!(asset_store.succeeded());
}

#[test]
fn warnings_do_not_fail_the_report() {
    let tmp = TempDir::new().expect("tempdir");
    let report = suite(&tmp, vec![Probe::new("warn", Behavior::Warn, ALL)])
        .validate(&package(&tmp, false), ValidationContext::LocalDevelopment)
        .expect("validate");
    assert!(report.succeeded());
    assert_eq!(report.status(), ReportStatus::Warnings);
    let warnings: Vec<_> = report.warnings().collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].0, "warn");
}

#[test]
fn error_message_fails_the_check() {
    let tmp = TempDir::new().expect("tempdir");
    let report = suite(&tmp, vec![Probe::new("reject", Behavior::Reject, ALL)])
        .validate(&package(&tmp, false), ValidationContext::LocalDevelopment)
        .expect("validate");
    assert_eq!(report.outcome("reject").map(|o| o.state), Some(CheckState::Failed));
    assert!(!report.succeeded());
}

#[test]
fn diff_evaluation_is_not_run_without_previous_version() {
    let tmp = TempDir::new().expect("tempdir");
    let suite = ValidationSuite::new(CheckRegistry::with_builtin_checks(), tmp.path().join("results"))
        .with_store(ReportStore::in_memory());
    let report = suite
        .validate(&package(&tmp, false), ValidationContext::Promotion)
        .expect("validate");

    let outcome = report.outcome("diff-evaluation").expect("diff outcome");
    assert_eq!(outcome.state, CheckState::NotRun);
    assert!(
        outcome
            .messages
            .iter()
            .any(|m| m.text == "No previous package version. Skipping diff evaluation.")
    );
    assert!(report.succeeded());
    assert!(!tmp.path().join("results").join("com.example.pkg@1.1.0.delta").exists());
}

#[test]
fn diff_evaluation_writes_delta_and_logs_activity() {
    let tmp = TempDir::new().expect("tempdir");
    let log = Arc::new(MemoryLog::new());
    let suite = ValidationSuite::new(CheckRegistry::with_builtin_checks(), tmp.path().join("results"))
        .with_store(ReportStore::in_memory())
        .with_activity_log(log.clone());
    let report = suite
        .validate(&package(&tmp, true), ValidationContext::Promotion)
        .expect("validate");

    assert_eq!(
        report.outcome("diff-evaluation").map(|o| o.state),
        Some(CheckState::Succeeded)
    );
    let delta = tmp.path().join("results").join("com.example.pkg@1.1.0.delta");
    assert!(delta.is_file());

    let events: Vec<EventType> = log.entries().iter().map(|entry| entry.event).collect();
    assert_eq!(
        events,
        vec![
            EventType::ValidationStart,
            EventType::CheckComplete,
            EventType::DeltaReportWritten,
            EventType::ValidationComplete,
        ]
    );
    assert!(suite.report(&report.package_id).expect("lookup").is_some());
}
