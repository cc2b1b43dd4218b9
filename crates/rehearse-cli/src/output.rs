//! Report rendering

use crate::error::CliResult;
use console::{style, Style, Term};
use rehearse::{RunOutcome, RunReport, StepReport, StepStatus};
use serde::{Deserialize, Serialize};

/// Output format for run reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Writes run reports to stdout and notices to stderr
#[derive(Debug)]
pub struct Reporter {
    out: Term,
    err: Term,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl Reporter {
    /// Create a new reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            out: Term::stdout(),
            err: Term::stderr(),
            use_color,
            quiet,
        }
    }

    /// Print a run report in `format`
    pub fn report(&self, report: &RunReport, format: OutputFormat) -> CliResult<()> {
        let rendered = match format {
            OutputFormat::Json => render_json(report)?,
            OutputFormat::Text if self.quiet && report.is_success() => return Ok(()),
            OutputFormat::Text => render_text(report, self.use_color),
        };
        self.out.write_line(rendered.trim_end())?;
        Ok(())
    }

    /// Print a line to stdout
    pub fn line(&self, text: &str) -> CliResult<()> {
        self.out.write_line(text)?;
        Ok(())
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("✓").green().bold().to_string()
        } else {
            "PASS".to_string()
        };

        let _ = self.err.write_line(&format!("{prefix} {message}"));
    }
}

/// Pretty JSON form of a report
pub fn render_json(report: &RunReport) -> CliResult<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

fn status_label(status: StepStatus, use_color: bool) -> String {
    let (plain, styled) = match status {
        StepStatus::Succeeded => ("PASS", Style::new().green().bold()),
        StepStatus::Failed => ("FAIL", Style::new().red().bold()),
        StepStatus::Skipped => ("SKIP", Style::new().yellow()),
        StepStatus::Pending | StepStatus::Running => ("....", Style::new().dim()),
    };
    if use_color {
        styled.apply_to(plain).to_string()
    } else {
        plain.to_string()
    }
}

fn step_line(step: &StepReport, use_color: bool) -> String {
    let mut line = format!(
        "{} {:>3} {}",
        status_label(step.status, use_color),
        step.index + 1,
        step.description
    );
    if step.status != StepStatus::Skipped && step.elapsed_ms > 0 {
        line.push_str(&format!(" ({}ms)", step.elapsed_ms));
    }
    if let Some(error) = &step.error {
        line.push_str(&format!("\n         {error}"));
    }
    line
}

/// Human-readable form of a report
#[must_use]
pub fn render_text(report: &RunReport, use_color: bool) -> String {
    let title = report.name.as_deref().unwrap_or("script");
    let mut out = if use_color {
        format!("{}\n", style(title).bold().underlined())
    } else {
        format!("=== {title} ===\n")
    };

    for step in &report.steps {
        out.push_str(&step_line(step, use_color));
        out.push('\n');
    }

    let passed = report.count(StepStatus::Succeeded);
    let failed = report.count(StepStatus::Failed);
    let skipped = report.count(StepStatus::Skipped);
    let verdict = match report.outcome {
        RunOutcome::Succeeded => "PASSED",
        RunOutcome::Failed { .. } => "FAILED",
        RunOutcome::Cancelled { .. } => "CANCELLED",
    };
    let verdict = if !use_color {
        verdict.to_string()
    } else if report.is_success() {
        style(verdict).green().bold().to_string()
    } else {
        style(verdict).red().bold().to_string()
    };
    out.push_str(&format!(
        "\n{verdict} {} steps in {:.2}s ({passed} passed, {failed} failed, {skipped} skipped)\n",
        report.steps.len(),
        report.elapsed_ms as f64 / 1000.0
    ));
    out
}
