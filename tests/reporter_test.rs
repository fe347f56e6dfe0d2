use hreflint::aggregator::ReportAggregator;
use hreflint::models::{AlternateLink, AuditReport, PageAuditResult, PageMetadata};
use hreflint::reporter::Reporter;
use hreflint::rules::RuleEngine;
use std::fs;
use tempfile::tempdir;

const HEADER: &str = "Page URL,Row Type,hreflang,href,In Head,Self-Referencing,Absolute URL,Valid Language Code,Matches Canonical,Matches HTML Lang,Result,Reasons";

fn create_test_report() -> AuditReport {
    let engine = RuleEngine::default();
    let mut aggregator = ReportAggregator::new(engine.version(), engine.columns());

    let page = PageMetadata {
        page_url: "https://ex.com/en".to_string(),
        current_url: "https://ex.com/en".to_string(),
        html_lang: None,
        canonical_url: Some("https://ex.com/en".to_string()),
        og_url: None,
        alternate_links: vec![
            AlternateLink {
                language_tag: Some("en".to_string()),
                href: "https://ex.com/en".to_string(),
                in_head: true,
            },
            AlternateLink {
                language_tag: Some("fr".to_string()),
                href: "/fr".to_string(),
                in_head: true,
            },
        ],
    };
    aggregator.add_page(&engine.evaluate(&page));

    let empty = PageMetadata {
        page_url: "https://ex.com/empty".to_string(),
        current_url: "https://ex.com/empty".to_string(),
        alternate_links: vec![],
        ..page
    };
    aggregator.add_page(&engine.evaluate(&empty));

    aggregator.finalize()
}

fn csv_string(report: &AuditReport) -> String {
    let mut buffer = Vec::new();
    Reporter::write_csv(report, &mut buffer).expect("CSV write should succeed");
    String::from_utf8(buffer).expect("CSV should be UTF-8")
}

#[test]
fn test_csv_header_matches_rule_table() {
    let report = create_test_report();
    let header = Reporter::csv_header(&report);

    assert_eq!(header.join(","), HEADER);
    assert_eq!(header.len(), 4 + report.columns.len() + 2);
}

#[test]
fn test_csv_rows() {
    let report = create_test_report();
    let csv = csv_string(&report);
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines.len(), 1 + report.rows.len());
    assert_eq!(lines[0], HEADER);
    assert_eq!(
        lines[1],
        "https://ex.com/en,tag,en,https://ex.com/en,OK,OK,OK,OK,OK,OK,OK,"
    );
    assert_eq!(
        lines[2],
        "https://ex.com/en,tag,fr,/fr,OK,FAIL,FAIL,OK,FAIL,OK,FAIL,\
         href '/fr' is not self-referencing (current URL: https://ex.com/en); \
         href '/fr' is not an absolute http(s) URL; \
         href '/fr' does not match canonical URL https://ex.com/en"
    );
    assert_eq!(
        lines[3],
        "https://ex.com/en,page,,,,,,,,,FAIL,Missing x-default hreflang tag"
    );
    assert_eq!(
        lines[4],
        "https://ex.com/empty,page,,,,,,,,,FAIL,No hreflang tags found"
    );
}

#[test]
fn test_csv_quotes_delimiters_and_quotes() {
    let engine = RuleEngine::default();
    let mut aggregator = ReportAggregator::new(engine.version(), engine.columns());
    aggregator.add_page(&PageAuditResult::extraction_failed(
        "https://ex.com/a,b",
        "server said \"no\"",
    ));
    let report = aggregator.finalize();

    let csv = csv_string(&report);
    let row = csv.lines().nth(1).expect("row should exist");

    assert_eq!(
        row,
        r#""https://ex.com/a,b",page,,,,,,,,,FAIL,"Failed to load page: server said ""no""""#
    );
}

#[test]
fn test_csv_is_reproducible() {
    let report = create_test_report();
    assert_eq!(csv_string(&report), csv_string(&report));
}

#[test]
fn test_save_csv_report_creates_parent_directories() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("results").join("nested").join("report.csv");
    let report = create_test_report();

    Reporter::save_csv_report(&report, &path).expect("save should succeed");

    let contents = fs::read_to_string(&path).unwrap();
    assert_eq!(contents, csv_string(&report));
}

#[test]
fn test_save_csv_report_fails_on_unwritable_path() {
    let dir = tempdir().unwrap();
    // A file where a directory is expected
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "").unwrap();

    let result = Reporter::save_csv_report(&create_test_report(), &blocker.join("report.csv"));
    assert!(result.is_err());
}

#[test]
fn test_save_json_report() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("report.json");
    let report = create_test_report();

    Reporter::save_json_report(&report, &path).expect("save should succeed");

    let contents = fs::read_to_string(&path).unwrap();
    let parsed: AuditReport = serde_json::from_str(&contents).unwrap();
    assert_eq!(parsed.rows, report.rows);
    assert_eq!(parsed.summary.urls_checked, 2);
    assert_eq!(parsed.summary.total_failures, 3);

    let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(value["rows"][1]["kind"], "tag");
    assert_eq!(value["rows"][1]["checks"][1]["verdict"]["verdict"], "FAIL");
    assert_eq!(value["rows"][0]["checks"][0]["verdict"]["verdict"], "OK");
}

#[test]
fn test_print_text_report_does_not_panic() {
    Reporter::print_text_report(&create_test_report());
}
