//! Configuration loading for the pipeline.
//!
//! Configuration is resolved exactly once at process start into an immutable
//! [`PipelineConfig`] and passed explicitly into registry resolution - no
//! component reads ambient environment state after that point.
//!
//! The environment surface is flat:
//!
//! - `FAIL_FAST`, `PARALLEL`, `VERBOSE` - global run options
//! - `ENABLE_<CHECK>` - per-check enablement (all checks default enabled)
//! - `<CHECK>_IMAGE` - per-check container image override
//! - `<CHECK>_ARGS` - whitespace-split extra arguments for one check
//!
//! Unknown keys are ignored; the registry only consults overrides for names
//! it knows.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Global run options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOptions {
    /// Stop scheduling further checks after the first failure.
    pub fail_fast: bool,
    /// Run checks concurrently rather than in sequence.
    pub parallel: bool,
    /// Show captured tool output in the report.
    pub verbose: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            fail_fast: true,
            parallel: true,
            verbose: false,
        }
    }
}

/// Per-check configuration overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckOverride {
    /// Enable or disable the check; `None` keeps the registry default.
    pub enabled: Option<bool>,
    /// Replacement container image.
    pub image: Option<String>,
    /// Extra argument tokens appended to the check's command.
    pub extra_args: Option<Vec<String>>,
}

impl CheckOverride {
    fn is_empty(&self) -> bool {
        self.enabled.is_none() && self.image.is_none() && self.extra_args.is_none()
    }
}

/// Immutable configuration for one pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Global run options.
    pub options: RunOptions,
    /// Overrides keyed by lowercase check name.
    overrides: HashMap<String, CheckOverride>,
}

/// Convert an environment-variable value to a boolean.
///
/// Accepts `true`, `1`, `yes`, `on` (case-insensitive) as truthy.
pub fn str_to_bool(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

impl PipelineConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Build configuration from an iterator of key/value pairs.
    ///
    /// Factored out of [`from_env`](Self::from_env) so tests never touch
    /// process-global state.
    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut config = Self::default();

        for (key, value) in vars {
            match key.as_str() {
                "FAIL_FAST" => config.options.fail_fast = str_to_bool(&value),
                "PARALLEL" => config.options.parallel = str_to_bool(&value),
                "VERBOSE" => config.options.verbose = str_to_bool(&value),
                _ => {
                    if let Some(name) = key.strip_prefix("ENABLE_") {
                        if !name.is_empty() {
                            config.entry(name).enabled = Some(str_to_bool(&value));
                        }
                    } else if let Some(name) = key.strip_suffix("_IMAGE") {
                        if !name.is_empty() {
                            config.entry(name).image = Some(value);
                        }
                    } else if let Some(name) = key.strip_suffix("_ARGS") {
                        if !name.is_empty() {
                            config.entry(name).extra_args =
                                Some(value.split_whitespace().map(String::from).collect());
                        }
                    }
                    // Anything else is not ours; ignore it.
                }
            }
        }

        config
    }

    fn entry(&mut self, name: &str) -> &mut CheckOverride {
        self.overrides.entry(name.to_lowercase()).or_default()
    }

    /// Look up the override for a check name, if any was configured.
    #[must_use]
    pub fn override_for(&self, name: &str) -> Option<&CheckOverride> {
        self.overrides
            .get(&name.to_lowercase())
            .filter(|o| !o.is_empty())
    }

    // =========================================================================
    // Builder helpers (tests and CLI overrides)
    // =========================================================================

    /// Set fail-fast.
    #[must_use]
    pub fn with_fail_fast(mut self, enabled: bool) -> Self {
        self.options.fail_fast = enabled;
        self
    }

    /// Set parallel execution.
    #[must_use]
    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.options.parallel = enabled;
        self
    }

    /// Set verbose reporting.
    #[must_use]
    pub fn with_verbose(mut self, enabled: bool) -> Self {
        self.options.verbose = enabled;
        self
    }

    /// Enable or disable a single check.
    #[must_use]
    pub fn with_check_enabled(mut self, name: &str, enabled: bool) -> Self {
        self.entry(name).enabled = Some(enabled);
        self
    }

    /// Override a single check's image.
    #[must_use]
    pub fn with_check_image(mut self, name: &str, image: impl Into<String>) -> Self {
        self.entry(name).image = Some(image.into());
        self
    }

    /// Set a single check's extra arguments.
    #[must_use]
    pub fn with_check_args(
        mut self,
        name: &str,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.entry(name).extra_args = Some(args.into_iter().map(Into::into).collect());
        self
    }
}
