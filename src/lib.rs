pub mod aggregator;
pub mod auditor;
pub mod cli;
pub mod config;
pub mod extractor;
pub mod http_client;
pub mod models;
pub mod reporter;
pub mod rules;

use anyhow::Result;
use auditor::{Auditor, AuditorConfig};
use colored::*;
use config::{OutputFormat, RunConfig};
use extractor::HttpExtractor;
use models::AuditReport;
use reporter::Reporter;
use rules::RuleEngine;

pub async fn run(config: RunConfig) -> Result<AuditReport> {
    println!(
        "{}",
        "hreflint - hreflang & Canonical Auditor"
            .bright_cyan()
            .bold()
    );
    println!("{}", "=".repeat(50).bright_blue());
    println!();

    println!("{} {}", "URLs to audit:".bright_white().bold(), config.urls.len());
    println!(
        "{} {}",
        "Report file:".bright_white().bold(),
        config.output.display()
    );
    println!();

    let extractor = HttpExtractor::new(config.timeout_secs)?;
    let engine = RuleEngine::new(config.policy);

    let mut auditor = Auditor::new(
        extractor,
        engine,
        AuditorConfig {
            concurrency: config.concurrency,
            requests_per_second: config.rate_limit,
        },
    );

    if config.urls.len() > 1 && !config.verbose {
        auditor.enable_progress_bar(config.urls.len());
    }

    if config.verbose {
        println!("{}", "Auditing pages...".bright_yellow());
    }

    let report = auditor.run(&config.urls).await;

    println!(
        "{} {} URLs checked, {} failures found",
        "Done:".bright_green().bold(),
        report.summary.urls_checked,
        report.summary.total_failures
    );

    match config.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report)?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            Reporter::print_text_report(&report);
        }
    }

    Reporter::save_csv_report(&report, &config.output)?;

    if let Some(path) = &config.json_output {
        Reporter::save_json_report(&report, path)?;
    }

    Ok(report)
}
