//! Single-check execution.
//!
//! [`run_check`] executes exactly one resolved check against the isolation
//! provider and produces exactly one [`CheckResult`]. Tool-level failures
//! are always converted into result data, never propagated - one check's
//! failure must never prevent collection of the others. Only a systemic
//! provider error, which makes the result fundamentally unobtainable,
//! escapes to the engine.

use std::path::Path;
use std::time::Instant;

use tracing::debug;

use crate::check::{CheckResult, ResolvedCheck};
use crate::provider::{IsolationProvider, ProviderError};

/// Execute one check and normalize its outcome.
///
/// # Errors
///
/// Returns an error only when the provider is unusable for the run as a
/// whole ([`ProviderError::Unavailable`]). Per-check provisioning and
/// launch failures become failed results with an infrastructure-class
/// diagnostic.
pub async fn run_check(
    check: &ResolvedCheck,
    snapshot: &Path,
    provider: &dyn IsolationProvider,
) -> Result<CheckResult, ProviderError> {
    let name = &check.descriptor.name;
    let command = check.descriptor.full_command();
    let start = Instant::now();

    debug!(check = %name, image = %check.descriptor.image, "Running check");

    let outcome = provider
        .execute(&check.descriptor.image, &command, snapshot)
        .await;
    let duration_ms = start.elapsed().as_millis() as u64;

    match outcome {
        Ok(output) => {
            let success = (check.interpreter)(&output);

            let mut result = CheckResult {
                name: name.clone(),
                success,
                output: output.stdout,
                error: output.stderr,
                duration_ms,
            };

            // A failure must never be silent.
            if !success && result.output.is_empty() && result.error.is_empty() {
                result.error = format!("tool exited with status {}", output.exit_code);
            }

            debug!(check = %name, success, duration_ms, "Check finished");
            Ok(result)
        }
        Err(err) if err.is_systemic() => Err(err),
        Err(err) => {
            debug!(check = %name, error = %err, "Check could not be run");
            Ok(CheckResult::infra_fail(name, err.to_string()).with_duration(duration_ms))
        }
    }
}
