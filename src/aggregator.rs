use crate::models::{AuditReport, AuditSummary, PageAuditResult, ReportRow, RuleColumn};
use std::time::Instant;

/// Folds page results into a report, one page at a time
pub struct ReportAggregator {
    ruleset_version: u32,
    columns: Vec<RuleColumn>,
    rows: Vec<ReportRow>,
    urls_checked: usize,
    total_failures: usize,
    started: Instant,
    snapshot: Option<AuditReport>,
}

impl ReportAggregator {
    pub fn new(ruleset_version: u32, columns: Vec<RuleColumn>) -> Self {
        Self {
            ruleset_version,
            columns,
            rows: Vec::new(),
            urls_checked: 0,
            total_failures: 0,
            started: Instant::now(),
            snapshot: None,
        }
    }

    /// Appends tag rows in tag order, then page issue rows
    pub fn add_page(&mut self, result: &PageAuditResult) {
        let tag_rows = result
            .tags
            .iter()
            .map(|tag| ReportRow::from_tag(&result.page_url, tag));
        let issue_rows = result
            .issues
            .iter()
            .map(|issue| ReportRow::from_issue(&result.page_url, issue));

        for row in tag_rows.chain(issue_rows) {
            if row.has_failure() {
                self.total_failures += 1;
            }
            self.rows.push(row);
        }

        self.urls_checked += 1;
        self.snapshot = None;
    }

    pub fn urls_checked(&self) -> usize {
        self.urls_checked
    }

    pub fn total_failures(&self) -> usize {
        self.total_failures
    }

    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    /// Returns the report. Repeated calls without an `add_page` in between
    /// return the same snapshot, elapsed time and timestamp included.
    pub fn finalize(&mut self) -> AuditReport {
        if let Some(report) = &self.snapshot {
            return report.clone();
        }

        let report = AuditReport {
            ruleset_version: self.ruleset_version,
            columns: self.columns.clone(),
            rows: self.rows.clone(),
            summary: AuditSummary {
                urls_checked: self.urls_checked,
                total_failures: self.total_failures,
                elapsed_secs: self.started.elapsed().as_secs_f64(),
            },
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        self.snapshot = Some(report.clone());
        report
    }
}
