use crossterm::style::{Color, Stylize};
use std::io::Write;

use crate::analyzer::classify::ErrorCategory;
use crate::analyzer::{Analysis, FrequencyTable};
use crate::types::Severity;
use crate::utils::{format_duration, get_color, paint, percentage, truncate};

/// Example error text is cut to this many characters.
const EXAMPLE_CHARS: usize = 80;
/// Sample messages are cut to this many characters.
const SAMPLE_CHARS: usize = 100;

#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    pub top: usize,
    pub color: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            top: 5,
            color: false,
        }
    }
}

fn severity_color(severity: &str) -> Color {
    match severity {
        "ERROR" => Color::Red,
        "WARN" => Color::Yellow,
        _ => Color::Green,
    }
}

fn heading<W: Write>(out: &mut W, title: &str, color: bool) -> std::io::Result<()> {
    if color {
        writeln!(out, "\n{}", title.bold())
    } else {
        writeln!(out, "\n{}", title)
    }
}

fn write_table<W: Write>(
    out: &mut W,
    title: &str,
    table: &FrequencyTable,
    paint_value: impl Fn(&str) -> String,
) -> std::io::Result<()> {
    writeln!(out, "{} ({} distinct):", title, table.len())?;
    for (value, count, pct) in table.percentages() {
        writeln!(out, "  {}: {} ({:.1}%)", paint_value(value), count, pct)?;
    }
    Ok(())
}

/// Render the full console report for an analysis.
pub fn write_report<W: Write>(
    out: &mut W,
    analysis: &Analysis,
    options: &ReportOptions,
) -> std::io::Result<()> {
    let color = options.color;

    writeln!(out, "=== Coralogix EKS Fargate Log Analysis ===")?;
    writeln!(out, "Total log entries: {}", analysis.total)?;
    if analysis.total == 0 {
        writeln!(out, "No log records found.")?;
        return Ok(());
    }

    heading(out, "Distributions", color)?;
    write_table(out, "Severity", &analysis.severities, |v| {
        paint(v, severity_color(v), color)
    })?;
    write_table(out, "Applications", &analysis.applications, |v| {
        paint(v, get_color(v), color)
    })?;
    write_table(out, "Containers/Subsystems", &analysis.subsystems, |v| {
        v.to_string()
    })?;
    write_table(out, "Namespaces", &analysis.namespaces, |v| v.to_string())?;
    if !analysis.environments.is_empty() {
        write_table(out, "Environments", &analysis.environments, |v| v.to_string())?;
    }
    if !analysis.versions.is_empty() {
        write_table(out, "Versions", &analysis.versions, |v| v.to_string())?;
    }

    heading(out, "Kubernetes Metadata", color)?;
    writeln!(out, "  Unique pods: {}", analysis.pods.len())?;
    writeln!(out, "  Unique Fargate hosts: {}", analysis.hosts.len())?;

    let errors = analysis.error_count();
    heading(out, &format!("Error Analysis ({} errors)", errors), color)?;
    for category in ErrorCategory::ALL {
        let Some(summary) = analysis.error_categories.get(&category) else {
            continue;
        };
        writeln!(
            out,
            "  {}: {} errors ({:.1}%)",
            category,
            summary.count,
            percentage(summary.count, errors)
        )?;
        writeln!(out, "    Example: {}", truncate(&summary.example, EXAMPLE_CHARS))?;
    }

    heading(
        out,
        &format!("Top {} Problem Sources", options.top),
        color,
    )?;
    for (key, records) in analysis.top_problem_buckets(options.top) {
        let errors = records
            .iter()
            .filter(|r| r.severity == Severity::Error)
            .count();
        writeln!(
            out,
            "  {}/{}: {} problems ({} ERROR, {} WARN)",
            paint(&key.application, get_color(&key.application), color),
            key.subsystem,
            records.len(),
            errors,
            records.len() - errors
        )?;
        if let Some(latest) = records.last() {
            writeln!(
                out,
                "    Latest: [{}] {}",
                latest.severity,
                truncate(&latest.text, EXAMPLE_CHARS)
            )?;
            if let Some(details) = &latest.error_details {
                writeln!(out, "    Details: {}", details)?;
            }
        }
    }

    if !analysis.error_samples.is_empty() {
        heading(out, "Sample Errors", color)?;
        for (app, samples) in &analysis.error_samples {
            writeln!(out, "  {}:", paint(app, get_color(app), color))?;
            for sample in samples {
                writeln!(out, "    - {}", truncate(sample, SAMPLE_CHARS))?;
            }
        }
    }

    if let Some(range) = analysis.time_range {
        heading(out, "Time Range", color)?;
        writeln!(out, "  Start: {}", range.start.format("%Y-%m-%d %H:%M:%S UTC"))?;
        writeln!(out, "  End: {}", range.end.format("%Y-%m-%d %H:%M:%S UTC"))?;
        writeln!(out, "  Duration: {}", format_duration(range.duration()))?;
    }

    Ok(())
}
