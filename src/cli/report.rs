//! Report formatting and printing utilities.
//!
//! Findings are printed in cargo-style format. Kept apart from the index so keyscope
//! can be used as a library.

use std::io::{self, Write};

use colored::Colorize;
use unicode_width::UnicodeWidthStr;

use crate::findings::{Finding, Report, Severity};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

/// Print findings in cargo-style format to stdout.
pub fn report(findings: &[Finding]) {
    report_to(findings, &mut io::stdout().lock());
}

/// Print findings to a custom writer. Findings are expected in report order.
pub fn report_to<W: Write>(findings: &[Finding], writer: &mut W) {
    if findings.is_empty() {
        return;
    }

    let max_line_width = calculate_max_line_width(findings);
    for finding in findings {
        print_finding(finding, writer, max_line_width);
    }
    print_summary(findings, writer);
}

/// Print a success message when nothing was found.
pub fn print_success(translation_files: usize, locales: usize) {
    print_success_to(translation_files, locales, &mut io::stdout().lock());
}

pub fn print_success_to<W: Write>(translation_files: usize, locales: usize, writer: &mut W) {
    let _ = writeln!(
        writer,
        "{} {}",
        SUCCESS_MARK.green(),
        format!(
            "Checked {} translation {} in {} {} - no issues found",
            translation_files,
            plural(translation_files, "file", "files"),
            locales,
            plural(locales, "locale", "locales"),
        )
        .green()
    );
}

/// Print the outcome of a command that did not report findings.
pub fn print_done(message: &str) {
    println!("{} {}", SUCCESS_MARK.green(), message.green());
}

/// Print a refused or failed operation to stderr.
pub fn print_failure(message: &str) {
    eprintln!("{} {}", FAILURE_MARK.red(), message);
}

fn print_finding<W: Write>(finding: &Finding, writer: &mut W, max_line_width: usize) {
    let loc = finding.location();
    let severity = finding.report_severity();
    let severity_str = match severity {
        Severity::Error => "error".bold().red(),
        Severity::Warning => "warning".bold().yellow(),
    };

    let _ = writeln!(
        writer,
        "{}: \"{}\"  {}",
        severity_str,
        finding.message(),
        finding.report_rule().to_string().dimmed().cyan()
    );

    if loc.line == 0 {
        let _ = writeln!(writer, "  {} {}", "-->".blue(), loc.file);
    } else {
        let _ = writeln!(
            writer,
            "  {} {}:{}:{}",
            "-->".blue(),
            loc.file,
            loc.line,
            loc.col
        );
    }

    if let Some(source_line) = loc.source_line {
        let caret_char = match severity {
            Severity::Error => "^".red(),
            Severity::Warning => "^".yellow(),
        };

        let _ = writeln!(
            writer,
            "{:>width$} {}",
            "",
            "|".blue(),
            width = max_line_width
        );
        let _ = writeln!(
            writer,
            "{:>width$} {} {}",
            loc.line.to_string().blue(),
            "|".blue(),
            source_line,
            width = max_line_width
        );

        // col is 1-based
        let prefix: String = source_line.chars().take(loc.col.saturating_sub(1)).collect();
        let caret_padding = UnicodeWidthStr::width(prefix.as_str());
        let _ = writeln!(
            writer,
            "{:>width$} {} {:>padding$}{}",
            "",
            "|".blue(),
            "",
            caret_char,
            width = max_line_width,
            padding = caret_padding
        );
    }

    if let Some(details) = finding.details() {
        let _ = writeln!(
            writer,
            "{:>width$} {} {} {}",
            "",
            "=".blue(),
            "note:".bold(),
            details,
            width = max_line_width
        );
    }

    let _ = writeln!(writer);
}

fn print_summary<W: Write>(findings: &[Finding], writer: &mut W) {
    let total_errors = findings
        .iter()
        .filter(|f| f.severity() == Severity::Error)
        .count();
    let total_warnings = findings.len() - total_errors;

    let _ = writeln!(
        writer,
        "{} {} {} ({} {}, {} {})",
        FAILURE_MARK.red(),
        findings.len(),
        plural(findings.len(), "problem", "problems"),
        total_errors,
        plural(total_errors, "error", "errors").red(),
        total_warnings,
        plural(total_warnings, "warning", "warnings").yellow()
    );
}

fn calculate_max_line_width(findings: &[Finding]) -> usize {
    findings
        .iter()
        .map(|f| f.location().line)
        .filter(|line| *line > 0)
        .max()
        .map(|n| n.to_string().len())
        .unwrap_or(1)
}

pub(crate) fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 { one } else { many }
}
