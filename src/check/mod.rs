//! Check descriptors and results.
//!
//! A [`CheckDescriptor`] is the immutable definition of one runnable unit:
//! which image to run in, which command to run, and what configuration
//! appended to it. A [`CheckResult`] is the normalized outcome every check
//! produces regardless of how heterogeneous the underlying tool is.
//!
//! Verdict interpretation is deliberately indirect: each registered check
//! carries an [`Interpreter`] mapping the raw exit-status/output triple to
//! pass/fail, so the engine and runner stay tool-agnostic. Adding a tool
//! means registering a descriptor, not modifying engine logic.

pub mod registry;

use serde::{Deserialize, Serialize};

use crate::provider::ExecOutput;

pub use registry::{CheckRegistry, ResolvedCheck};

// ============================================================================
// Verdict Interpretation
// ============================================================================

/// Maps a raw execution outcome to a pass/fail verdict.
///
/// Plain function pointer rather than a trait object: interpretation rules
/// are stateless and registered once at startup.
pub type Interpreter = fn(&ExecOutput) -> bool;

/// Default interpretation rule: exit status zero is a pass.
///
/// Every builtin check uses this; tools with inverted or multi-valued exit
/// conventions register their own rule instead.
pub fn exit_zero(output: &ExecOutput) -> bool {
    output.exit_code == 0
}

// ============================================================================
// Check Descriptor
// ============================================================================

/// Immutable definition of one runnable check.
///
/// Constructed once during registry resolution, before any execution
/// begins; owned by the engine for the duration of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckDescriptor {
    /// Unique identifier, stable across runs; used for display and ordering.
    pub name: String,
    /// Resolved once from configuration; never re-evaluated mid-run.
    pub enabled: bool,
    /// Container image reference to run in.
    pub image: String,
    /// Argument tokens to execute inside the environment.
    pub command: Vec<String>,
    /// Additional tokens appended to `command`, from configuration overrides.
    pub extra_args: Vec<String>,
}

impl CheckDescriptor {
    /// Create a descriptor with no extra args, enabled by default.
    pub fn new(
        name: impl Into<String>,
        image: impl Into<String>,
        command: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            image: image.into(),
            command: command.into_iter().map(Into::into).collect(),
            extra_args: Vec::new(),
        }
    }

    /// The full command line: `command` followed by `extra_args`.
    #[must_use]
    pub fn full_command(&self) -> Vec<String> {
        let mut cmd = self.command.clone();
        cmd.extend(self.extra_args.iter().cloned());
        cmd
    }
}

// ============================================================================
// Check Result
// ============================================================================

/// Diagnostic prefix marking a failure to reach the tool at all.
pub const INFRA_ERROR_PREFIX: &str = "could not run tool: ";

/// Normalized outcome of one check.
///
/// Invariant: a failed result always carries non-empty `output` or `error` -
/// the runner synthesizes a diagnostic when the tool produced nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    /// Name copied from the originating descriptor.
    pub name: String,
    /// Verdict after interpretation.
    pub success: bool,
    /// Captured standard output.
    pub output: String,
    /// Captured standard error, or a synthesized diagnostic when the runner
    /// itself failed to reach the tool.
    pub error: String,
    /// Elapsed wall-clock time, for reporting only.
    pub duration_ms: u64,
}

impl CheckResult {
    /// Create a passing result.
    pub fn pass(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            success: true,
            output: String::new(),
            error: String::new(),
            duration_ms: 0,
        }
    }

    /// Create a failing result with a diagnostic.
    pub fn fail(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            success: false,
            output: String::new(),
            error: error.into(),
            duration_ms: 0,
        }
    }

    /// Create a failing result for a check whose tool could not be run at
    /// all, as opposed to running and reporting failure.
    ///
    /// The diagnostic carries a fixed prefix so reporters can tell the two
    /// failure classes apart; the verdict treats them identically.
    pub fn infra_fail(name: impl Into<String>, diagnostic: impl Into<String>) -> Self {
        Self::fail(
            name,
            format!("{}{}", INFRA_ERROR_PREFIX, diagnostic.into()),
        )
    }

    /// Whether this failure came from the runner being unable to reach the
    /// tool, rather than the tool reporting failure.
    #[must_use]
    pub fn is_infrastructure_failure(&self) -> bool {
        self.error.starts_with(INFRA_ERROR_PREFIX)
    }

    /// Add captured stdout.
    #[must_use]
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }

    /// Add captured stderr / diagnostic text.
    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = error.into();
        self
    }

    /// Add duration.
    #[must_use]
    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// One-line summary for display.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.success {
            format!("✅ {}: PASSED", self.name)
        } else {
            format!("❌ {}: FAILED", self.name)
        }
    }
}
