//! Registry of known checks.
//!
//! The registry holds the full universe of checks in registration order and
//! resolves, once per run, which are enabled. Resolution is deterministic:
//! the same configuration always yields the same descriptors in the same
//! order. Registration order, not enablement order, decides the sequence.

use crate::check::{exit_zero, CheckDescriptor, Interpreter};
use crate::config::PipelineConfig;
use crate::error::{GauntletError, Result};

/// A descriptor paired with its verdict interpretation rule, ready to run.
#[derive(Clone, Debug)]
pub struct ResolvedCheck {
    pub descriptor: CheckDescriptor,
    pub interpreter: Interpreter,
}

struct Registration {
    name: &'static str,
    image: String,
    command: Vec<String>,
    interpreter: Interpreter,
}

/// Image for checks whose tool is installed at run time rather than baked in.
const PYTHON_IMAGE: &str = "python:3.11-slim";

/// Command for a tool distributed on PyPI.
///
/// The Python base image ships none of these tools, so each run installs the
/// package inside the container before invoking it. The trailing `"$@"`
/// forwards configured extra args to the tool; the `sh` token after the
/// script fills `$0` so appended args land in `$@`.
fn pypi_tool(package: &str, invocation: &str) -> Vec<String> {
    vec![
        "sh".to_string(),
        "-c".to_string(),
        format!("pip install --quiet {package} && {invocation} \"$@\""),
        "sh".to_string(),
    ]
}

fn argv(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|t| (*t).to_string()).collect()
}

/// Ordered registry of all known checks.
pub struct CheckRegistry {
    entries: Vec<Registration>,
}

impl CheckRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// The builtin check universe.
    ///
    /// Default images and commands match the original pipeline's per-tool
    /// defaults. Tools whose image already ships them run a bare argv; tools
    /// distributed on PyPI are provisioned via [`pypi_tool`]. All builtin
    /// tools follow the exit-status-zero convention, so they share the
    /// [`exit_zero`] rule; the per-check indirection exists for tools that
    /// do not.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();

        let builtins: Vec<(&'static str, &str, Vec<String>)> = vec![
            (
                "markdown",
                "davidanson/markdownlint-cli2:latest",
                argv(&["markdownlint-cli2", "**/*.md"]),
            ),
            ("ruff", PYTHON_IMAGE, pypi_tool("ruff", "ruff check .")),
            ("mypy", PYTHON_IMAGE, pypi_tool("mypy", "mypy .")),
            ("ty", PYTHON_IMAGE, pypi_tool("ty", "ty check .")),
            (
                "black",
                PYTHON_IMAGE,
                pypi_tool("black", "black --check --diff ."),
            ),
            (
                "bandit",
                PYTHON_IMAGE,
                pypi_tool("'bandit[toml]'", "bandit -r ."),
            ),
            (
                "semgrep",
                "returntocorp/semgrep:latest",
                argv(&["semgrep", "--config=auto"]),
            ),
            ("safety", PYTHON_IMAGE, pypi_tool("safety", "safety scan")),
            (
                "terraform",
                "hashicorp/terraform:latest",
                argv(&["terraform", "fmt", "-check", "-recursive"]),
            ),
            (
                "tflint",
                "ghcr.io/terraform-linters/tflint:latest",
                argv(&["tflint"]),
            ),
            (
                "gitleaks",
                "zricethezav/gitleaks:latest",
                argv(&["gitleaks", "detect", "--source", ".", "--verbose"]),
            ),
        ];

        for (name, image, command) in builtins {
            registry
                .register(name, image, command, exit_zero)
                .expect("builtin names are unique");
        }

        registry
    }

    /// Register a check.
    ///
    /// # Errors
    ///
    /// Fails when `name` is already registered - descriptor names are the
    /// registry's keys and must be unique.
    pub fn register(
        &mut self,
        name: &'static str,
        image: impl Into<String>,
        command: impl IntoIterator<Item = impl Into<String>>,
        interpreter: Interpreter,
    ) -> Result<()> {
        if self.entries.iter().any(|e| e.name == name) {
            return Err(GauntletError::invalid_config(
                name,
                "duplicate check name in registry",
            ));
        }

        self.entries.push(Registration {
            name,
            image: image.into(),
            command: command.into_iter().map(Into::into).collect(),
            interpreter,
        });
        Ok(())
    }

    /// Names of all registered checks, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name)
    }

    /// Number of registered checks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve the enabled checks for one run.
    ///
    /// Deterministic over `config`; never mutates it. Disabled checks are
    /// omitted entirely - they will produce no result.
    ///
    /// # Errors
    ///
    /// Fails before any execution starts when an enabled check has an empty
    /// command or an empty image reference.
    pub fn resolve(&self, config: &PipelineConfig) -> Result<Vec<ResolvedCheck>> {
        let mut resolved = Vec::new();

        for entry in &self.entries {
            let overrides = config.override_for(entry.name);

            let enabled = overrides
                .and_then(|o| o.enabled)
                .unwrap_or(true);
            if !enabled {
                continue;
            }

            let image = overrides
                .and_then(|o| o.image.clone())
                .unwrap_or_else(|| entry.image.clone());
            let extra_args = overrides
                .and_then(|o| o.extra_args.clone())
                .unwrap_or_default();

            if entry.command.is_empty() {
                return Err(GauntletError::invalid_config(
                    entry.name,
                    "enabled check has an empty command",
                ));
            }
            if image.trim().is_empty() {
                return Err(GauntletError::invalid_config(
                    entry.name,
                    "enabled check has an empty image reference",
                ));
            }

            resolved.push(ResolvedCheck {
                descriptor: CheckDescriptor {
                    name: entry.name.to_string(),
                    enabled: true,
                    image,
                    command: entry.command.clone(),
                    extra_args,
                },
                interpreter: entry.interpreter,
            });
        }

        Ok(resolved)
    }
}

impl Default for CheckRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
