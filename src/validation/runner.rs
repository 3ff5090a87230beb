//! Isolated execution of selected checks on a bounded worker pool.
//!
//! Every check runs behind its own failure boundary: a returned error or a
//! panic becomes a Failed outcome for that check and the remaining checks
//! still run. Outcomes are returned in the order the checks were given,
//! whatever order they finished in.

#![allow(missing_docs)]

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crossbeam_channel as channel;

use crate::validation::check::{Check, CheckContext};
use crate::validation::outcome::{CheckMessage, CheckOutcome, CheckState, CheckVerdict, Severity};

/// Runs checks with at most `parallelism` executing at once.
#[derive(Debug, Clone, Copy)]
pub struct CheckRunner {
    parallelism: usize,
}

impl Default for CheckRunner {
    fn default() -> Self {
        Self::new(1)
    }
}

impl CheckRunner {
    #[must_use]
    pub fn new(parallelism: usize) -> Self {
        Self {
            parallelism: parallelism.max(1),
        }
    }

    #[must_use]
    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    pub fn run(&self, checks: &[Arc<dyn Check>], ctx: &CheckContext<'_>) -> Vec<CheckOutcome> {
        self.run_with(checks, ctx, &|_| {})
    }

    /// Like [`CheckRunner::run`], calling `on_complete` as each outcome lands.
    pub fn run_with(
        &self,
        checks: &[Arc<dyn Check>],
        ctx: &CheckContext<'_>,
        on_complete: &(dyn Fn(&CheckOutcome) + Sync),
    ) -> Vec<CheckOutcome> {
        let workers = self.parallelism.min(checks.len());
        if workers <= 1 {
            return checks
                .iter()
                .map(|check| {
                    let outcome = run_isolated(check.as_ref(), ctx);
                    on_complete(&outcome);
                    outcome
                })
                .collect();
        }

        let (work_tx, work_rx) = channel::unbounded::<(usize, &Arc<dyn Check>)>();
        let (done_tx, done_rx) = channel::unbounded::<(usize, CheckOutcome)>();
        for item in checks.iter().enumerate() {
            let _ = work_tx.send(item);
        }
        drop(work_tx);

        thread::scope(|scope| {
            for _ in 0..workers {
                let work_rx = work_rx.clone();
                let done_tx = done_tx.clone();
                scope.spawn(move || {
                    for (index, check) in work_rx {
                        let outcome = run_isolated(check.as_ref(), ctx);
                        on_complete(&outcome);
                        if done_tx.send((index, outcome)).is_err() {
                            break;
                        }
                    }
                });
            }
        });
        drop(done_tx);

        let mut slots: Vec<Option<CheckOutcome>> = vec![None; checks.len()];
        for (index, outcome) in done_rx {
            slots[index] = Some(outcome);
        }
        slots.into_iter().flatten().collect()
    }
}

/// Execute one check behind a failure boundary and classify its verdict.
pub fn run_isolated(check: &dyn Check, ctx: &CheckContext<'_>) -> CheckOutcome {
    let descriptor = check.descriptor();
    let started = Instant::now();
    let result = catch_unwind(AssertUnwindSafe(|| check.run(ctx)));
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    let (state, messages) = match result {
        Ok(Ok(CheckVerdict::Skip { reason })) => (
            CheckState::NotRun,
            vec![CheckMessage::new(Severity::Information, reason)],
        ),
        Ok(Ok(CheckVerdict::Outcome { messages, passed })) => {
            let has_error = messages.iter().any(|m| m.severity == Severity::Error);
            let state = if passed && !has_error {
                CheckState::Succeeded
            } else {
                CheckState::Failed
            };
            (state, messages)
        }
        Ok(Err(err)) => (
            CheckState::Failed,
            vec![CheckMessage::new(Severity::Error, err.to_string())],
        ),
        Err(payload) => (
            CheckState::Failed,
            vec![CheckMessage::new(
                Severity::Error,
                format!("check panicked: {}", panic_payload_to_string(payload.as_ref())),
            )],
        ),
    };

    CheckOutcome {
        id: descriptor.id.clone(),
        name: descriptor.name.clone(),
        category: descriptor.category,
        state,
        messages,
        elapsed_ms,
    }
}

fn panic_payload_to_string(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
