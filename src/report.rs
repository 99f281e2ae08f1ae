//! Result reporting.
//!
//! Renders a [`RunOutcome`](crate::engine::RunOutcome) either as a colored
//! terminal table or as machine-readable JSON. Rendering is pure string
//! production; only [`Reporter::print`] touches stdout, which keeps every
//! format testable.

use std::fmt::Write as _;
use std::str::FromStr;

use colored::Colorize;
use serde::Serialize;

use crate::check::CheckResult;
use crate::engine::RunOutcome;
use crate::error::{GauntletError, Result};

/// Output format for the run report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportFormat {
    /// Human-readable colored table.
    #[default]
    Table,
    /// Machine-readable JSON document.
    Json,
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Table => write!(f, "table"),
            ReportFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for ReportFormat {
    type Err = GauntletError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "table" => Ok(ReportFormat::Table),
            "json" => Ok(ReportFormat::Json),
            _ => Err(GauntletError::invalid_config(
                "format",
                format!("unknown report format: {s}. Valid formats: table, json"),
            )),
        }
    }
}

/// Serialized shape of the JSON report.
#[derive(Serialize)]
struct JsonReport<'a> {
    passed: bool,
    results: &'a [CheckResult],
}

/// Renders run outcomes for display.
pub struct Reporter {
    verbose: bool,
}

impl Reporter {
    /// Create a reporter; `verbose` includes captured tool output.
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Render the outcome in the requested format.
    ///
    /// # Errors
    ///
    /// Only JSON serialization can fail.
    pub fn render(&self, outcome: &RunOutcome, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Table => Ok(self.render_table(outcome)),
            ReportFormat::Json => self.render_json(outcome),
        }
    }

    /// Render and write to stdout.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`render`](Self::render).
    pub fn print(&self, outcome: &RunOutcome, format: ReportFormat) -> Result<()> {
        println!("{}", self.render(outcome, format)?);
        Ok(())
    }

    fn render_table(&self, outcome: &RunOutcome) -> String {
        let mut out = String::new();

        let _ = writeln!(out);
        let _ = writeln!(out, "{}", "Check Results".bold());
        let _ = writeln!(out, "{}", "─".repeat(60));

        for result in &outcome.results {
            let status = if result.success {
                "✓ PASS".green()
            } else {
                "✗ FAIL".red()
            };

            let _ = writeln!(
                out,
                "  {:<12} {}  ({} ms)",
                result.name.cyan(),
                status,
                result.duration_ms
            );

            if !result.success && !result.error.is_empty() {
                let _ = writeln!(out, "    {}", truncated(&result.error).dimmed());
            }
            if self.verbose && !result.output.is_empty() {
                let _ = writeln!(out, "    {}", truncated(&result.output).dimmed());
            }
        }

        let _ = writeln!(out, "{}", "─".repeat(60));

        let failed = outcome.failures().len();
        if outcome.passed {
            let _ = writeln!(out, "{}", "All checks passed!".green().bold());
        } else {
            let _ = writeln!(
                out,
                "{}",
                format!("{failed} check(s) failed").red().bold()
            );
        }

        out
    }

    fn render_json(&self, outcome: &RunOutcome) -> Result<String> {
        let report = JsonReport {
            passed: outcome.passed,
            results: &outcome.results,
        };
        Ok(serde_json::to_string_pretty(&report)?)
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(false)
    }
}

/// First line of a diagnostic, clamped for table display. The full text is
/// always available through the JSON format.
fn truncated(text: &str) -> String {
    const MAX: usize = 100;
    let line = text.lines().next().unwrap_or_default();
    let mut clamped: String = line.chars().take(MAX).collect();
    if line.chars().count() > MAX {
        clamped.push('…');
    }
    clamped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(results: Vec<CheckResult>) -> RunOutcome {
        let passed = results.iter().all(|r| r.success);
        RunOutcome { results, passed }
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("table".parse::<ReportFormat>().unwrap(), ReportFormat::Table);
        assert_eq!("JSON".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert!("yaml".parse::<ReportFormat>().is_err());
    }

    #[test]
    fn test_table_lists_every_result() {
        let reporter = Reporter::new(false);
        let rendered = reporter
            .render(
                &outcome(vec![
                    CheckResult::pass("ruff").with_duration(120),
                    CheckResult::fail("black", "2 files would be reformatted"),
                ]),
                ReportFormat::Table,
            )
            .unwrap();

        assert!(rendered.contains("ruff"));
        assert!(rendered.contains("black"));
        assert!(rendered.contains("2 files would be reformatted"));
        assert!(rendered.contains("1 check(s) failed"));
    }

    #[test]
    fn test_table_reports_full_success() {
        let reporter = Reporter::new(false);
        let rendered = reporter
            .render(
                &outcome(vec![CheckResult::pass("ruff")]),
                ReportFormat::Table,
            )
            .unwrap();

        assert!(rendered.contains("All checks passed!"));
    }

    #[test]
    fn test_verbose_includes_tool_output() {
        let results = vec![CheckResult::pass("bandit").with_output("No issues identified.")];

        let quiet = Reporter::new(false)
            .render(&outcome(results.clone()), ReportFormat::Table)
            .unwrap();
        let verbose = Reporter::new(true)
            .render(&outcome(results), ReportFormat::Table)
            .unwrap();

        assert!(!quiet.contains("No issues identified."));
        assert!(verbose.contains("No issues identified."));
    }

    #[test]
    fn test_json_round_trips_results() {
        let reporter = Reporter::default();
        let rendered = reporter
            .render(
                &outcome(vec![
                    CheckResult::pass("ruff").with_duration(42),
                    CheckResult::fail("gitleaks", "leaks found"),
                ]),
                ReportFormat::Json,
            )
            .unwrap();

        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["passed"], false);
        assert_eq!(value["results"][0]["name"], "ruff");
        assert_eq!(value["results"][0]["duration_ms"], 42);
        assert_eq!(value["results"][1]["success"], false);
    }

    #[test]
    fn test_truncated_clamps_long_lines() {
        let long = "x".repeat(300);
        let clamped = truncated(&long);
        assert_eq!(clamped.chars().count(), 101);
        assert!(clamped.ends_with('…'));
    }

    #[test]
    fn test_truncated_takes_first_line() {
        assert_eq!(truncated("first\nsecond"), "first");
        assert_eq!(truncated(""), "");
    }
}
