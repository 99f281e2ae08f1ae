//! Container-runtime adapter for the isolation provider.
//!
//! Shells out to `docker` (or `podman`) for each check: the source snapshot
//! is staged into a per-invocation temporary copy, bind-mounted read-write at
//! `/src`, and the check's command is run with `/src` as the working
//! directory. Staging per invocation is what keeps concurrently running
//! checks from observing each other's in-place edits.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use super::{ExecOutput, IsolationProvider, ProviderError};

/// Runtime binaries probed in order of preference.
const RUNTIME_CANDIDATES: &[&str] = &["docker", "podman"];

/// Exit status used by the docker CLI when the daemon or image fails before
/// the container command runs.
const RUNTIME_ERROR_EXIT: i32 = 125;

static STAGING_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Isolation provider backed by a local container runtime.
pub struct DockerProvider {
    binary: PathBuf,
}

impl DockerProvider {
    /// Locate a container runtime on PATH.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Unavailable`] when neither `docker` nor
    /// `podman` is installed - the run cannot proceed at all.
    pub fn new() -> Result<Self, ProviderError> {
        for candidate in RUNTIME_CANDIDATES {
            if let Ok(binary) = which::which(candidate) {
                debug!(runtime = %binary.display(), "Using container runtime");
                return Ok(Self { binary });
            }
        }

        Err(ProviderError::Unavailable(format!(
            "no container runtime found in PATH (tried: {})",
            RUNTIME_CANDIDATES.join(", ")
        )))
    }

    /// Create a provider for a specific runtime binary.
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Copy the source snapshot into a fresh staging directory.
    ///
    /// Each invocation gets its own copy so autofixers can rewrite files
    /// without leaking edits into other checks' mounts or the caller's tree.
    async fn stage_snapshot(&self, source: &Path, image: &str) -> Result<PathBuf, ProviderError> {
        let staging = std::env::temp_dir().join(format!(
            "gauntlet-{}-{}",
            std::process::id(),
            STAGING_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));

        let source = source.to_path_buf();
        let target = staging.clone();
        let copied = tokio::task::spawn_blocking(move || copy_tree(&source, &target))
            .await
            .map_err(|e| ProviderError::Provision {
                image: image.to_string(),
                message: format!("staging task failed: {}", e),
            })?;

        copied.map_err(|e| ProviderError::Provision {
            image: image.to_string(),
            message: format!("failed to stage source snapshot: {}", e),
        })?;

        Ok(staging)
    }
}

/// Map a runtime exit status to a provider error, or pass the tool's own
/// status through.
fn classify_exit(image: &str, exit_code: i32, stderr: &str) -> Result<i32, ProviderError> {
    match exit_code {
        RUNTIME_ERROR_EXIT => Err(ProviderError::Provision {
            image: image.to_string(),
            message: diagnostic_line(stderr),
        }),
        // 126: command found but not runnable; 127: command not found.
        126 | 127 => Err(ProviderError::Launch {
            image: image.to_string(),
            message: diagnostic_line(stderr),
        }),
        code => Ok(code),
    }
}

fn diagnostic_line(s: &str) -> String {
    let line = s.lines().last().unwrap_or("").trim();
    if line.is_empty() {
        "no diagnostic output".to_string()
    } else {
        line.to_string()
    }
}

fn copy_tree(from: &Path, to: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(to)?;
    for entry in std::fs::read_dir(from)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let target = to.join(entry.file_name());

        if file_type.is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else if file_type.is_file() {
            std::fs::copy(entry.path(), &target)?;
        }
        // Symlinks are skipped: a link out of the snapshot must not leak
        // host paths into the container mount.
    }
    Ok(())
}

#[async_trait]
impl IsolationProvider for DockerProvider {
    async fn execute(
        &self,
        image: &str,
        command: &[String],
        source: &Path,
    ) -> Result<ExecOutput, ProviderError> {
        let staging = self.stage_snapshot(source, image).await?;

        debug!(image, ?command, staging = %staging.display(), "Executing check in container");

        let output = Command::new(&self.binary)
            .arg("run")
            .arg("--rm")
            .arg("-v")
            .arg(format!("{}:/src", staging.display()))
            .arg("-w")
            .arg("/src")
            .arg(image)
            .args(command)
            .output()
            .await;

        // Best-effort cleanup; the staging copy is disposable either way.
        let cleanup = staging.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = std::fs::remove_dir_all(&cleanup) {
                warn!(path = %cleanup.display(), error = %e, "Failed to remove staging copy");
            }
        });

        let output = output.map_err(|e| {
            // The runtime binary existed at construction time; failing to
            // spawn it now means the provider as a whole is broken.
            ProviderError::Unavailable(format!(
                "failed to spawn {}: {}",
                self.binary.display(),
                e
            ))
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        let exit_code = output.status.code().unwrap_or(-1);

        let exit_code = classify_exit(image, exit_code, &stderr)?;

        Ok(ExecOutput {
            stdout,
            stderr,
            exit_code,
        })
    }
}
