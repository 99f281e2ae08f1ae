//! Isolation provider abstraction.
//!
//! A provider executes a command against a named environment image with a
//! mounted copy of the source tree and returns the raw output triple. The
//! engine and runner consume this trait; they do not care whether the
//! implementation is a container runtime, a subprocess, or a remote sandbox.
//!
//! # Error classes
//!
//! [`ProviderError`] separates two failure modes the rest of the system
//! treats very differently:
//!
//! - `Provision` / `Launch` - one check's environment or command could not
//!   be started. The check runner absorbs these into a failed
//!   [`CheckResult`](crate::check::CheckResult).
//! - `Unavailable` - the provider cannot serve the run at all. This aborts
//!   the run as an infrastructure error.

pub mod docker;

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

pub use docker::DockerProvider;

/// Raw outcome of one command execution inside an environment.
#[derive(Debug, Clone, Default)]
pub struct ExecOutput {
    /// Captured standard output, in full.
    pub stdout: String,
    /// Captured standard error, in full. Kept even on success - some tools
    /// emit informational warnings on stderr without failing.
    pub stderr: String,
    /// The tool's exit status.
    pub exit_code: i32,
}

impl ExecOutput {
    /// Construct an outcome with both streams and an exit status.
    pub fn new(stdout: impl Into<String>, stderr: impl Into<String>, exit_code: i32) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            exit_code,
        }
    }

    /// Outcome of a tool that exited cleanly with the given stdout.
    pub fn success(stdout: impl Into<String>) -> Self {
        Self::new(stdout, "", 0)
    }
}

/// Errors raised by an isolation provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The environment for one check could not be created.
    #[error("failed to provision environment '{image}': {message}")]
    Provision { image: String, message: String },

    /// The command for one check could not be started inside its environment.
    #[error("failed to launch command in '{image}': {message}")]
    Launch { image: String, message: String },

    /// The provider is unusable for the run as a whole.
    #[error("isolation provider unavailable: {0}")]
    Unavailable(String),
}

impl ProviderError {
    /// Systemic errors abort the whole run; the rest are absorbed per check.
    pub fn is_systemic(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// External executor for check commands.
///
/// Implementations must support many concurrent invocations without
/// cross-talk between their mounted sources: a check that rewrites files in
/// place must never be observed doing so by another concurrently running
/// check.
#[async_trait]
pub trait IsolationProvider: Send + Sync {
    /// Execute `command` inside `image` with `source` mounted read-write at
    /// the working directory.
    ///
    /// A tool that runs and exits non-zero is a *successful* execution from
    /// the provider's point of view; only failures to provision the
    /// environment or start the command are errors.
    async fn execute(
        &self,
        image: &str,
        command: &[String],
        source: &Path,
    ) -> Result<ExecOutput, ProviderError>;
}
