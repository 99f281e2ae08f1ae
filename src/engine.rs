//! Execution engine: scheduling, fail-fast policy, and aggregation.
//!
//! The engine owns the set of enabled checks for one run, dispatches them
//! to the check runner either concurrently or in strict sequence, and
//! aggregates the results into a [`RunOutcome`]. An engine instance serves
//! exactly one run: [`ExecutionEngine::execute`] consumes it.
//!
//! # Ordering
//!
//! Sequential mode executes in input order by construction. Parallel mode
//! launches one task per check, collects completions in whatever order they
//! arrive, and re-sorts them into the input order before returning, so
//! downstream reporting is deterministic even though execution was not.
//!
//! # Fail-fast
//!
//! Sequential fail-fast stops after the first failing check; later checks
//! are omitted from the results entirely. Parallel fail-fast lets in-flight
//! checks finish but prevents not-yet-started ones from launching. Where
//! exactly the cutover lands between two near-simultaneous completions is a
//! race, intentionally left non-deterministic.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

use crate::check::{CheckResult, ResolvedCheck};
use crate::error::{GauntletError, Result};
use crate::provider::IsolationProvider;
use crate::runner::run_check;

// ============================================================================
// Scheduling Mode
// ============================================================================

/// How the engine schedules checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// All checks launched concurrently; output re-sorted to input order.
    Parallel,
    /// One check at a time, strictly in input order.
    Sequential,
}

// ============================================================================
// Cancellation
// ============================================================================

/// Run-level cancellation signal.
///
/// Once triggered, no not-yet-started check will start in either mode.
/// In-flight provider calls are not interrupted - cancellation of external
/// work is best-effort only.
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create an untriggered token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Trigger cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been triggered.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Completion Events
// ============================================================================

/// Emitted once per completed check, in completion order.
///
/// Purely for live reporting; consumers can never influence scheduling.
#[derive(Debug, Clone)]
pub struct CheckEvent {
    pub name: String,
    pub success: bool,
    pub duration_ms: u64,
}

impl From<&CheckResult> for CheckEvent {
    fn from(result: &CheckResult) -> Self {
        Self {
            name: result.name.clone(),
            success: result.success,
            duration_ms: result.duration_ms,
        }
    }
}

// ============================================================================
// Run Outcome
// ============================================================================

/// Ordered results plus the overall verdict for one run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Results in input-check order.
    pub results: Vec<CheckResult>,
    /// AND-reduction over all produced results; an empty run passes.
    pub passed: bool,
}

impl RunOutcome {
    fn from_results(results: Vec<CheckResult>) -> Self {
        let passed = results.iter().all(|r| r.success);
        Self { results, passed }
    }

    /// Only the failing results.
    #[must_use]
    pub fn failures(&self) -> Vec<&CheckResult> {
        self.results.iter().filter(|r| !r.success).collect()
    }
}

// ============================================================================
// Execution Engine
// ============================================================================

/// Runs a set of enabled checks under one scheduling mode.
pub struct ExecutionEngine {
    provider: Arc<dyn IsolationProvider>,
    snapshot: PathBuf,
    cancel: CancelToken,
    events: Option<UnboundedSender<CheckEvent>>,
}

impl ExecutionEngine {
    /// Create an engine for one run over the given source snapshot.
    pub fn new(provider: Arc<dyn IsolationProvider>, snapshot: impl Into<PathBuf>) -> Self {
        Self {
            provider,
            snapshot: snapshot.into(),
            cancel: CancelToken::new(),
            events: None,
        }
    }

    /// Handle for cancelling this run from outside.
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Attach a completion-event channel for live reporting.
    #[must_use]
    pub fn with_events(mut self, events: UnboundedSender<CheckEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Run all checks and aggregate their results.
    ///
    /// Consumes the engine - one instance, one run.
    ///
    /// # Errors
    ///
    /// Only engine-level failures abort: a provider that is unusable for
    /// the run as a whole, or a panicked check task. A check that merely
    /// fails is data, not an error.
    pub async fn execute(
        self,
        checks: Vec<ResolvedCheck>,
        mode: ExecutionMode,
        fail_fast: bool,
    ) -> Result<RunOutcome> {
        if checks.is_empty() {
            debug!("No checks to run; vacuously successful");
            return Ok(RunOutcome::from_results(Vec::new()));
        }

        info!(
            count = checks.len(),
            ?mode,
            fail_fast,
            "Dispatching checks"
        );

        let results = match mode {
            ExecutionMode::Sequential => self.run_sequential(checks, fail_fast).await?,
            ExecutionMode::Parallel => self.run_parallel(checks, fail_fast).await?,
        };

        Ok(RunOutcome::from_results(results))
    }

    async fn run_sequential(
        &self,
        checks: Vec<ResolvedCheck>,
        fail_fast: bool,
    ) -> Result<Vec<CheckResult>> {
        let mut results = Vec::with_capacity(checks.len());

        for check in &checks {
            if self.cancel.is_cancelled() {
                info!("Run cancelled; skipping remaining checks");
                break;
            }

            let result = run_check(check, &self.snapshot, self.provider.as_ref()).await?;
            self.emit(&result);

            let failed = !result.success;
            results.push(result);

            if failed && fail_fast {
                info!(check = %check.descriptor.name, "Failing fast");
                break;
            }
        }

        Ok(results)
    }

    async fn run_parallel(
        &self,
        checks: Vec<ResolvedCheck>,
        fail_fast: bool,
    ) -> Result<Vec<CheckResult>> {
        // Set by the first observed failure. Tasks consult it only before
        // they start, so in-flight checks always run to completion.
        let halt = Arc::new(AtomicBool::new(false));

        let handles: Vec<_> = checks
            .into_iter()
            .enumerate()
            .map(|(index, check)| {
                let provider = Arc::clone(&self.provider);
                let snapshot = self.snapshot.clone();
                let halt = Arc::clone(&halt);
                let cancel = self.cancel.clone();
                let events = self.events.clone();

                tokio::spawn(async move {
                    if cancel.is_cancelled() || (fail_fast && halt.load(Ordering::SeqCst)) {
                        debug!(check = %check.descriptor.name, "Not started: run halted");
                        return (index, None);
                    }

                    let outcome = run_check(&check, &snapshot, provider.as_ref()).await;

                    if let Ok(result) = &outcome {
                        if !result.success {
                            halt.store(true, Ordering::SeqCst);
                        }
                        if let Some(tx) = &events {
                            let _ = tx.send(CheckEvent::from(result));
                        }
                    }

                    (index, Some(outcome))
                })
            })
            .collect();

        let mut indexed = Vec::new();
        for joined in join_all(handles).await {
            let (index, outcome) = joined.map_err(|e| {
                GauntletError::infrastructure(format!("check task panicked: {}", e))
            })?;

            match outcome {
                None => {}
                Some(Ok(result)) => indexed.push((index, result)),
                Some(Err(provider_err)) => return Err(provider_err.into()),
            }
        }

        // Restore input order regardless of completion order.
        indexed.sort_by_key(|(index, _)| *index);
        Ok(indexed.into_iter().map(|(_, result)| result).collect())
    }

    fn emit(&self, result: &CheckResult) {
        if let Some(tx) = &self.events {
            let _ = tx.send(CheckEvent::from(result));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::{exit_zero, CheckDescriptor};
    use crate::provider::{ExecOutput, ProviderError};
    use async_trait::async_trait;
    use std::path::Path;

    /// Provider that passes every command instantly.
    struct AlwaysPass;

    #[async_trait]
    impl IsolationProvider for AlwaysPass {
        async fn execute(
            &self,
            _image: &str,
            _command: &[String],
            _source: &Path,
        ) -> std::result::Result<ExecOutput, ProviderError> {
            Ok(ExecOutput::success("ok"))
        }
    }

    fn check(name: &str) -> ResolvedCheck {
        ResolvedCheck {
            descriptor: CheckDescriptor::new(name, "img:latest", ["tool"]),
            interpreter: exit_zero,
        }
    }

    #[tokio::test]
    async fn test_empty_run_is_vacuously_successful() {
        for mode in [ExecutionMode::Parallel, ExecutionMode::Sequential] {
            let engine = ExecutionEngine::new(Arc::new(AlwaysPass), ".");
            let outcome = engine.execute(Vec::new(), mode, true).await.unwrap();
            assert!(outcome.results.is_empty());
            assert!(outcome.passed);
        }
    }

    #[tokio::test]
    async fn test_sequential_preserves_input_order() {
        let engine = ExecutionEngine::new(Arc::new(AlwaysPass), ".");
        let outcome = engine
            .execute(
                vec![check("ruff"), check("mypy"), check("black")],
                ExecutionMode::Sequential,
                false,
            )
            .await
            .unwrap();

        let names: Vec<&str> = outcome.results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["ruff", "mypy", "black"]);
        assert!(outcome.passed);
    }

    #[tokio::test]
    async fn test_cancelled_engine_starts_nothing() {
        let engine = ExecutionEngine::new(Arc::new(AlwaysPass), ".");
        engine.cancel_token().cancel();

        let outcome = engine
            .execute(
                vec![check("ruff"), check("mypy")],
                ExecutionMode::Sequential,
                false,
            )
            .await
            .unwrap();

        assert!(outcome.results.is_empty());
        // No results produced means the AND-reduction is vacuous.
        assert!(outcome.passed);
    }

    #[tokio::test]
    async fn test_events_emitted_per_completion() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let engine = ExecutionEngine::new(Arc::new(AlwaysPass), ".").with_events(tx);

        engine
            .execute(
                vec![check("ruff"), check("mypy")],
                ExecutionMode::Sequential,
                false,
            )
            .await
            .unwrap();

        let mut seen = Vec::new();
        while let Ok(event) = rx.try_recv() {
            seen.push(event.name);
        }
        assert_eq!(seen, vec!["ruff", "mypy"]);
    }

    #[test]
    fn test_run_outcome_failures() {
        let outcome = RunOutcome::from_results(vec![
            CheckResult::pass("a"),
            CheckResult::fail("b", "boom"),
            CheckResult::pass("c"),
        ]);

        assert!(!outcome.passed);
        let failures: Vec<&str> = outcome.failures().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(failures, vec!["b"]);
    }
}
