use crate::models::{AuditReport, ReportRow, RowKind};
use anyhow::{Context, Result};
use colored::*;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

pub const REASON_SEPARATOR: &str = "; ";

pub struct Reporter;

impl Reporter {
    /// Header row: fixed leading columns, one column per tag rule, then the result
    pub fn csv_header(report: &AuditReport) -> Vec<String> {
        let mut header = vec![
            "Page URL".to_string(),
            "Row Type".to_string(),
            "hreflang".to_string(),
            "href".to_string(),
        ];
        header.extend(report.columns.iter().map(|column| column.label.clone()));
        header.push("Result".to_string());
        header.push("Reasons".to_string());
        header
    }

    pub fn csv_record(report: &AuditReport, row: &ReportRow) -> Vec<String> {
        let mut record = vec![
            row.page_url.clone(),
            match row.kind {
                RowKind::Tag => "tag".to_string(),
                RowKind::Page => "page".to_string(),
            },
            row.language_tag.clone().unwrap_or_default(),
            row.href.clone().unwrap_or_default(),
        ];

        record.extend(report.columns.iter().map(|column| {
            row.verdict(column.check)
                .map(|verdict| verdict.label().to_string())
                .unwrap_or_default()
        }));

        record.push(if row.has_failure() { "FAIL" } else { "OK" }.to_string());
        record.push(row.reasons.join(REASON_SEPARATOR));
        record
    }

    pub fn write_csv<W: Write>(report: &AuditReport, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(Self::csv_header(report))?;
        for row in &report.rows {
            csv_writer.write_record(Self::csv_record(report, row))?;
        }
        csv_writer.flush()?;

        Ok(())
    }

    pub fn save_csv_report(report: &AuditReport, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let file = File::create(path)
            .with_context(|| format!("Failed to create report file: {}", path.display()))?;
        Self::write_csv(report, file)
            .with_context(|| format!("Failed to write CSV report: {}", path.display()))?;

        println!("Results saved to: {}", path.display().to_string().bright_green());
        Ok(())
    }

    pub fn save_json_report(report: &AuditReport, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        let mut file = File::create(path)
            .with_context(|| format!("Failed to create report file: {}", path.display()))?;
        file.write_all(json.as_bytes())?;
        println!("Report saved to: {}", path.display().to_string().bright_green());
        Ok(())
    }

    pub fn print_text_report(report: &AuditReport) {
        println!("\n{}", "=".repeat(80).bright_blue());
        println!("{}", "hreflint - Audit Report".bright_cyan().bold());
        println!("{}", "=".repeat(80).bright_blue());
        println!();

        println!(
            "{}: {}",
            "Timestamp".bright_white().bold(),
            report.timestamp
        );
        println!(
            "{}: v{}",
            "Rule set".bright_white().bold(),
            report.ruleset_version
        );
        println!();

        // Summary
        println!("{}", "Summary".bright_yellow().bold().underline());
        println!(
            "  URLs Checked:   {}",
            report.summary.urls_checked.to_string().bright_green()
        );
        println!(
            "  Total Failures: {}",
            if report.summary.total_failures > 0 {
                report.summary.total_failures.to_string().bright_red()
            } else {
                report.summary.total_failures.to_string().bright_green()
            }
        );
        println!(
            "  Elapsed:        {}",
            format!("{:.2}s", report.summary.elapsed_secs).bright_cyan()
        );
        println!();

        let failing_rows: Vec<_> = report.rows.iter().filter(|row| row.has_failure()).collect();

        if !failing_rows.is_empty() {
            println!("{}", "Failures".bright_yellow().bold().underline());

            let mut current_page: Option<&str> = None;
            for row in failing_rows {
                if current_page != Some(row.page_url.as_str()) {
                    println!();
                    println!("  {} {}", "URL:".bright_white().bold(), row.page_url);
                    current_page = Some(row.page_url.as_str());
                }

                let label = match row.kind {
                    RowKind::Tag => format!(
                        "[{}] {}",
                        row.language_tag.as_deref().unwrap_or("(none)"),
                        row.href.as_deref().unwrap_or_default()
                    ),
                    RowKind::Page => "[page]".to_string(),
                };
                println!("    {} {}", "FAIL".bright_red(), label);
                for reason in &row.reasons {
                    println!("      - {}", reason);
                }
            }
        }

        println!();
        println!("{}", "=".repeat(80).bright_blue());
    }
}
