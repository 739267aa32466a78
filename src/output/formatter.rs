//! Output formatters for batch results
//!
//! Provides table, JSON, markdown, and summary renderings of a verdict.

#![allow(dead_code)]

use serde::Serialize;
use std::fmt::Write as _;
use std::io::Write;

use crate::executor::BatchRun;
use crate::models::{MutationReport, SpecOutcome, SpecRun};
use crate::report::Verdict;

/// Formats a single mutation error for human output
pub trait ReportFormatter: Send + Sync {
    fn format_error_case(&self, report: &MutationReport) -> String;
}

/// `spec/account/mutation: error` with source and destination accounts
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainFormatter;

impl ReportFormatter for PlainFormatter {
    fn format_error_case(&self, report: &MutationReport) -> String {
        let mut line = format!(
            "{}: {}",
            report.path(),
            report.error.as_deref().unwrap_or("unknown error")
        );
        if let (Some(from), Some(to)) = (&report.account, &report.destination) {
            let _ = write!(line, " ({from} -> {to})");
        }
        line
    }
}

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    JsonPretty,
    Markdown,
    Summary,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            "markdown" | "md" => Some(OutputFormat::Markdown),
            "summary" => Some(OutputFormat::Summary),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    verdict: &'a Verdict,
    duration_ms: u64,
    runs: &'a [SpecRun],
}

/// Result formatter
pub struct ResultFormatter {
    format: OutputFormat,
    colorize: bool,
    errors: Box<dyn ReportFormatter>,
}

impl ResultFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: true,
            errors: Box::new(PlainFormatter),
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    pub fn with_error_formatter(mut self, formatter: impl ReportFormatter + 'static) -> Self {
        self.errors = Box::new(formatter);
        self
    }

    /// Render a batch and its verdict
    pub fn format_batch(&self, batch: &BatchRun, verdict: &Verdict) -> String {
        match self.format {
            OutputFormat::Table => self.format_table(batch, verdict),
            OutputFormat::Json | OutputFormat::JsonPretty => {
                let json = JsonReport {
                    verdict,
                    duration_ms: batch.duration_ms,
                    runs: &batch.runs,
                };
                if self.format == OutputFormat::JsonPretty {
                    serde_json::to_string_pretty(&json).unwrap_or_default()
                } else {
                    serde_json::to_string(&json).unwrap_or_default()
                }
            }
            OutputFormat::Markdown => self.format_markdown(batch, verdict),
            OutputFormat::Summary => verdict.to_string(),
        }
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if self.colorize {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    fn format_table(&self, batch: &BatchRun, verdict: &Verdict) -> String {
        let mut output = String::new();

        output.push_str("\n═══════════════════════════════════════════════════════════════\n");
        output.push_str(" Mutation Bot Results\n");
        output.push_str("═══════════════════════════════════════════════════════════════\n");

        for run in &batch.runs {
            let line = run.to_string();
            let line = match &run.outcome {
                SpecOutcome::Fatal(_) => self.paint(&line, "31"),
                SpecOutcome::Completed(_) if run.error_count() > 0 => self.paint(&line, "31"),
                SpecOutcome::Completed(reports) if reports.is_empty() => self.paint(&line, "33"),
                SpecOutcome::Completed(_) => self.paint(&line, "32"),
            };
            let _ = writeln!(output, " {line}");
        }

        output.push_str(" ───────────────────────────────────────────────────────────\n");
        let _ = writeln!(
            output,
            " Specs: {} | Mutations: {} | Pass: {} | Errors: {} | Fatals: {} | {}ms",
            verdict.total_specs,
            verdict.total_mutations,
            verdict.passed_mutations(),
            verdict.error_count(),
            verdict.fatal_count(),
            batch.duration_ms
        );

        if !verdict.fatals.is_empty() {
            output.push_str("\n Fatal errors:\n");
            for fatal in &verdict.fatals {
                let _ = writeln!(output, "   ! {fatal}");
            }
        }

        if !verdict.error_cases.is_empty() {
            output.push_str("\n Mutation errors:\n");
            for report in &verdict.error_cases {
                let _ = writeln!(output, "   ✗ {}", self.errors.format_error_case(report));
            }
        }

        if !verdict.zero_result_specs.is_empty() {
            output.push_str("\n Specs without any mutation run:\n");
            for name in &verdict.zero_result_specs {
                let _ = writeln!(output, "   ○ {name}");
            }
        }

        let status = if verdict.failed {
            self.paint("FAILED", "31")
        } else {
            self.paint("PASSED", "32")
        };
        let _ = writeln!(output, "\n Result: {status}");

        output
    }

    /// Markdown document, also used for the commit comment
    pub fn format_markdown(&self, batch: &BatchRun, verdict: &Verdict) -> String {
        let mut md = String::new();

        if verdict.failed {
            let _ = writeln!(
                md,
                "## ❌ Mutation bot: {} fatal(s), {} error(s)",
                verdict.fatal_count(),
                verdict.error_count()
            );
        } else {
            let _ = writeln!(
                md,
                "## ✅ Mutation bot: {} mutation(s) passed",
                verdict.total_mutations
            );
        }
        let _ = writeln!(
            md,
            "\n> {} spec(s), {} mutation(s) in {}ms\n",
            verdict.total_specs, verdict.total_mutations, batch.duration_ms
        );

        if !verdict.fatals.is_empty() {
            md.push_str("### Fatal errors\n\n");
            for fatal in &verdict.fatals {
                let _ = writeln!(md, "- **{}** got `{}`", fatal.spec.name, fatal.error);
            }
            md.push('\n');
        }

        if !verdict.error_cases.is_empty() {
            md.push_str("### Mutation errors\n\n");
            for report in &verdict.error_cases {
                let _ = writeln!(md, "- `{}`", self.errors.format_error_case(report));
            }
            md.push('\n');
        }

        if !verdict.zero_result_specs.is_empty() {
            md.push_str("### ⚠️ Specs without any mutation run\n\n");
            for name in &verdict.zero_result_specs {
                let _ = writeln!(md, "- {name}");
            }
            md.push('\n');
        }

        md.push_str("### Details\n\n");
        for run in &batch.runs {
            let _ = writeln!(md, "<details>\n<summary>{run}</summary>\n\n```");
            for line in &run.logs {
                let _ = writeln!(md, "{line}");
            }
            md.push_str("```\n\n</details>\n\n");
        }

        md
    }
}

impl Default for ResultFormatter {
    fn default() -> Self {
        Self::new(OutputFormat::Table)
    }
}

/// Write a rendered batch to a file
pub fn write_report_to_file(
    path: &str,
    batch: &BatchRun,
    verdict: &Verdict,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let formatter = ResultFormatter::new(format).no_color();
    let content = formatter.format_batch(batch, verdict);

    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())?;

    Ok(())
}
