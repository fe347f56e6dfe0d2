use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw metadata extracted from one rendered page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    /// The URL that was requested
    pub page_url: String,
    /// The URL the page resolved to after redirects
    pub current_url: String,
    pub html_lang: Option<String>,
    pub canonical_url: Option<String>,
    pub og_url: Option<String>,
    /// Alternate links in document order
    pub alternate_links: Vec<AlternateLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternateLink {
    /// Raw `hreflang` attribute, `None` when the attribute is missing
    pub language_tag: Option<String>,
    /// Raw `href` attribute, empty when the attribute is missing
    pub href: String,
    pub in_head: bool,
}

impl AlternateLink {
    pub fn is_x_default(&self) -> bool {
        self.language_tag.as_deref() == Some(X_DEFAULT)
    }
}

pub const X_DEFAULT: &str = "x-default";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", content = "reason")]
pub enum Verdict {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "FAIL")]
    Fail(String),
}

impl Verdict {
    pub fn fail(reason: impl Into<String>) -> Self {
        Verdict::Fail(reason.into())
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, Verdict::Fail(_))
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Verdict::Ok => None,
            Verdict::Fail(reason) => Some(reason),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Ok => "OK",
            Verdict::Fail(_) => "FAIL",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Identifies a per-tag rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TagCheck {
    InHead,
    SelfReferencing,
    AbsoluteUrl,
    ValidLanguageCode,
    CanonicalConsistency,
    LangAttributeConsistency,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub check: TagCheck,
    pub verdict: Verdict,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagAuditResult {
    pub language_tag: Option<String>,
    pub href: String,
    pub in_head: bool,
    pub checks: Vec<CheckOutcome>,
    /// Failure reasons in rule order
    pub reasons: Vec<String>,
}

impl TagAuditResult {
    pub fn has_failure(&self) -> bool {
        self.checks.iter().any(|outcome| outcome.verdict.is_fail())
    }

    pub fn verdict(&self, check: TagCheck) -> Option<&Verdict> {
        self.checks
            .iter()
            .find(|outcome| outcome.check == check)
            .map(|outcome| &outcome.verdict)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PageIssueKind {
    NoHreflangTags,
    ExtractionFailed,
    CanonicalMismatch,
    OgUrlMismatch,
    MissingCanonical,
    MissingOgUrl,
    MissingXDefault,
    MissingSelfReference,
}

/// A page-level finding. Every page issue is a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageIssue {
    pub kind: PageIssueKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageAuditResult {
    pub page_url: String,
    pub tags: Vec<TagAuditResult>,
    pub issues: Vec<PageIssue>,
}

impl PageAuditResult {
    /// Result for a page whose metadata could not be loaded
    pub fn extraction_failed(page_url: &str, error: impl fmt::Display) -> Self {
        Self {
            page_url: page_url.to_string(),
            tags: vec![],
            issues: vec![PageIssue {
                kind: PageIssueKind::ExtractionFailed,
                message: format!("Failed to load page: {}", error),
            }],
        }
    }

    pub fn row_count(&self) -> usize {
        self.tags.len() + self.issues.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowKind {
    Tag,
    Page,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub page_url: String,
    pub kind: RowKind,
    pub language_tag: Option<String>,
    pub href: Option<String>,
    /// Rule verdicts, empty for page rows
    pub checks: Vec<CheckOutcome>,
    pub issue: Option<PageIssueKind>,
    pub reasons: Vec<String>,
}

impl ReportRow {
    pub fn from_tag(page_url: &str, tag: &TagAuditResult) -> Self {
        Self {
            page_url: page_url.to_string(),
            kind: RowKind::Tag,
            language_tag: tag.language_tag.clone(),
            href: Some(tag.href.clone()),
            checks: tag.checks.clone(),
            issue: None,
            reasons: tag.reasons.clone(),
        }
    }

    pub fn from_issue(page_url: &str, issue: &PageIssue) -> Self {
        Self {
            page_url: page_url.to_string(),
            kind: RowKind::Page,
            language_tag: None,
            href: None,
            checks: vec![],
            issue: Some(issue.kind),
            reasons: vec![issue.message.clone()],
        }
    }

    pub fn has_failure(&self) -> bool {
        match self.kind {
            RowKind::Page => true,
            RowKind::Tag => self.checks.iter().any(|outcome| outcome.verdict.is_fail()),
        }
    }

    pub fn verdict(&self, check: TagCheck) -> Option<&Verdict> {
        self.checks
            .iter()
            .find(|outcome| outcome.check == check)
            .map(|outcome| &outcome.verdict)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    pub ruleset_version: u32,
    /// Tag rule columns, in rule table order
    pub columns: Vec<RuleColumn>,
    pub rows: Vec<ReportRow>,
    pub summary: AuditSummary,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleColumn {
    pub check: TagCheck,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditSummary {
    pub urls_checked: usize,
    pub total_failures: usize,
    pub elapsed_secs: f64,
}
