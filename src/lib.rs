//! Gauntlet - Containerized Quality Check Orchestrator
//!
//! Runs a suite of third-party analysis tools (linters, type checkers,
//! security scanners) against a source tree, each inside its own disposable
//! container, and aggregates their verdicts into a single pass/fail result.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`check`] - Check descriptors, results, and the builtin registry
//! - [`config`] - Environment-driven configuration loading
//! - [`engine`] - Parallel/sequential scheduling, fail-fast, aggregation
//! - [`error`] - Custom error types and the exit-code contract
//! - [`provider`] - Isolated execution environments (container runtimes)
//! - [`report`] - Table and JSON rendering of run outcomes
//! - [`runner`] - Single-check execution and result normalization
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use gauntlet::check::CheckRegistry;
//! use gauntlet::config::PipelineConfig;
//! use gauntlet::engine::{ExecutionEngine, ExecutionMode};
//! use gauntlet::provider::DockerProvider;
//!
//! let config = PipelineConfig::from_env();
//! let checks = CheckRegistry::builtin().resolve(&config)?;
//!
//! let provider = Arc::new(DockerProvider::new()?);
//! let engine = ExecutionEngine::new(provider, ".");
//! let outcome = engine
//!     .execute(checks, ExecutionMode::Parallel, config.options.fail_fast)
//!     .await?;
//!
//! std::process::exit(if outcome.passed { 0 } else { 1 });
//! ```

pub mod check;
pub mod config;
pub mod engine;
pub mod error;
pub mod provider;
pub mod report;
pub mod runner;

// Re-export commonly used types
pub use error::{GauntletError, Result};

// Re-export check types
pub use check::{
    exit_zero, CheckDescriptor, CheckRegistry, CheckResult, Interpreter, ResolvedCheck,
};

// Re-export configuration types
pub use config::{str_to_bool, CheckOverride, PipelineConfig, RunOptions};

// Re-export engine types
pub use engine::{CancelToken, CheckEvent, ExecutionEngine, ExecutionMode, RunOutcome};

// Re-export provider types
pub use provider::{DockerProvider, ExecOutput, IsolationProvider, ProviderError};

// Re-export reporting types
pub use report::{ReportFormat, Reporter};
