//! Output formatting for lint results.

use anyhow::Result;
use api_lint_core::{LintResult, Severity, Violation};
use std::io::{self, Write};

use crate::OutputFormat;

/// Prints lint results to stdout in the specified format.
pub fn print(result: &LintResult, format: OutputFormat) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write(&mut out, result, format)?;
    out.flush()?;
    Ok(())
}

/// Writes lint results in the specified format.
pub fn write(out: &mut impl Write, result: &LintResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => write_text(out, result)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, result)?;
            writeln!(out)?;
        }
        OutputFormat::Compact => write_compact(out, result)?,
    }
    Ok(())
}

fn label(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "\x1b[31merror\x1b[0m",
        Severity::Warning => "\x1b[33mwarning\x1b[0m",
        Severity::Info => "\x1b[34minfo\x1b[0m",
    }
}

fn write_violation(out: &mut impl Write, violation: &Violation) -> io::Result<()> {
    writeln!(
        out,
        "{} {} at {}:{}:{}",
        violation.code,
        violation.rule,
        violation.location.file.display(),
        violation.location.line,
        violation.location.column,
    )?;
    writeln!(out, "  {}: {}", label(violation.severity), violation.message)?;
    if let Some(fact) = &violation.fact {
        writeln!(out, "  = note: {fact}")?;
    }
    if let Some(suggestion) = &violation.suggestion {
        writeln!(out, "  = help: {}", suggestion.message)?;
    }
    writeln!(out)
}

fn write_text(out: &mut impl Write, result: &LintResult) -> io::Result<()> {
    let (errors, warnings, infos) = result.count_by_severity();

    for violation in &result.violations {
        write_violation(out, violation)?;
    }

    let summary_color = if errors > 0 {
        "\x1b[31m"
    } else if warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    writeln!(
        out,
        "{}Found {} error(s), {} warning(s), {} info(s) in {} file(s)\x1b[0m",
        summary_color, errors, warnings, infos, result.files_checked
    )
}

fn write_compact(out: &mut impl Write, result: &LintResult) -> io::Result<()> {
    for violation in &result.violations {
        writeln!(
            out,
            "{}:{}:{}: {} [{}] {}",
            violation.location.file.display(),
            violation.location.line,
            violation.location.column,
            violation.severity,
            violation.code,
            violation.message,
        )?;
    }
    Ok(())
}
