use crate::models::{
    AlternateLink, CheckOutcome, PageAuditResult, PageIssue, PageIssueKind, PageMetadata,
    RuleColumn, TagAuditResult, TagCheck, Verdict, X_DEFAULT,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// Version of the built-in rule table. Bump when a rule is added, removed or
/// its reason template changes.
pub const RULESET_VERSION: u32 = 2;

pub const NO_HREFLANG_TAGS_MESSAGE: &str = "No hreflang tags found";

static LANGUAGE_CODE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z]{2}(-[A-Z]{2})?$").expect("language code regex should be valid")
});

/// Whether absent canonical / og:url tags are reported as page issues
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulePolicy {
    pub require_canonical: bool,
    pub require_og_url: bool,
}

/// Page-level values computed once and shared by every rule of a page
#[derive(Debug, Clone)]
pub struct PageContext<'a> {
    pub current_url: &'a str,
    pub html_lang: Option<&'a str>,
    pub canonical_url: Option<&'a str>,
    pub og_url: Option<&'a str>,
    pub has_x_default: bool,
    pub has_self_reference: bool,
    pub policy: RulePolicy,
}

impl<'a> PageContext<'a> {
    pub fn new(metadata: &'a PageMetadata, policy: RulePolicy) -> Self {
        let current_url = metadata.current_url.as_str();
        Self {
            current_url,
            html_lang: metadata.html_lang.as_deref(),
            canonical_url: metadata.canonical_url.as_deref(),
            og_url: metadata.og_url.as_deref(),
            has_x_default: metadata.alternate_links.iter().any(AlternateLink::is_x_default),
            has_self_reference: metadata
                .alternate_links
                .iter()
                .any(|link| link.href == current_url),
            policy,
        }
    }
}

pub type TagPredicate = fn(&PageContext<'_>, &AlternateLink) -> Verdict;
pub type PagePredicate = fn(&PageContext<'_>) -> Verdict;

#[derive(Debug, Clone, Copy)]
pub struct TagRule {
    pub check: TagCheck,
    /// Column header used in reports
    pub label: &'static str,
    pub evaluate: TagPredicate,
}

#[derive(Debug, Clone, Copy)]
pub struct PageRule {
    pub kind: PageIssueKind,
    pub evaluate: PagePredicate,
}

/// Evaluates a rule table against the metadata of one page.
///
/// Rules never short-circuit each other: every tag rule runs for every tag, so
/// one tag can collect several failure reasons.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    version: u32,
    tag_rules: Vec<TagRule>,
    page_rules: Vec<PageRule>,
    policy: RulePolicy,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(RulePolicy::default())
    }
}

impl RuleEngine {
    pub fn new(policy: RulePolicy) -> Self {
        Self::with_rules(RULESET_VERSION, standard_tag_rules(), standard_page_rules(), policy)
    }

    pub fn with_rules(
        version: u32,
        tag_rules: Vec<TagRule>,
        page_rules: Vec<PageRule>,
        policy: RulePolicy,
    ) -> Self {
        Self {
            version,
            tag_rules,
            page_rules,
            policy,
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn policy(&self) -> RulePolicy {
        self.policy
    }

    pub fn columns(&self) -> Vec<RuleColumn> {
        self.tag_rules
            .iter()
            .map(|rule| RuleColumn {
                check: rule.check,
                label: rule.label.to_string(),
            })
            .collect()
    }

    pub fn evaluate(&self, metadata: &PageMetadata) -> PageAuditResult {
        // No tags means nothing to evaluate; the page gets a single terminal issue
        if metadata.alternate_links.is_empty() {
            return PageAuditResult {
                page_url: metadata.page_url.clone(),
                tags: vec![],
                issues: vec![PageIssue {
                    kind: PageIssueKind::NoHreflangTags,
                    message: NO_HREFLANG_TAGS_MESSAGE.to_string(),
                }],
            };
        }

        let context = PageContext::new(metadata, self.policy);

        let tags = metadata
            .alternate_links
            .iter()
            .map(|link| self.evaluate_tag(&context, link))
            .collect();

        let issues = self
            .page_rules
            .iter()
            .filter_map(|rule| match (rule.evaluate)(&context) {
                Verdict::Ok => None,
                Verdict::Fail(message) => Some(PageIssue {
                    kind: rule.kind,
                    message,
                }),
            })
            .collect();

        PageAuditResult {
            page_url: metadata.page_url.clone(),
            tags,
            issues,
        }
    }

    fn evaluate_tag(&self, context: &PageContext<'_>, link: &AlternateLink) -> TagAuditResult {
        let checks: Vec<CheckOutcome> = self
            .tag_rules
            .iter()
            .map(|rule| CheckOutcome {
                check: rule.check,
                verdict: (rule.evaluate)(context, link),
            })
            .collect();

        let reasons = checks
            .iter()
            .filter_map(|outcome| outcome.verdict.reason().map(str::to_string))
            .collect();

        TagAuditResult {
            language_tag: link.language_tag.clone(),
            href: link.href.clone(),
            in_head: link.in_head,
            checks,
            reasons,
        }
    }
}

pub fn standard_tag_rules() -> Vec<TagRule> {
    vec![
        TagRule {
            check: TagCheck::InHead,
            label: "In Head",
            evaluate: check_in_head,
        },
        TagRule {
            check: TagCheck::SelfReferencing,
            label: "Self-Referencing",
            evaluate: check_self_referencing,
        },
        TagRule {
            check: TagCheck::AbsoluteUrl,
            label: "Absolute URL",
            evaluate: check_absolute_url,
        },
        TagRule {
            check: TagCheck::ValidLanguageCode,
            label: "Valid Language Code",
            evaluate: check_language_code,
        },
        TagRule {
            check: TagCheck::CanonicalConsistency,
            label: "Matches Canonical",
            evaluate: check_canonical_consistency,
        },
        TagRule {
            check: TagCheck::LangAttributeConsistency,
            label: "Matches HTML Lang",
            evaluate: check_lang_attribute,
        },
    ]
}

pub fn standard_page_rules() -> Vec<PageRule> {
    vec![
        PageRule {
            kind: PageIssueKind::CanonicalMismatch,
            evaluate: check_canonical_self_match,
        },
        PageRule {
            kind: PageIssueKind::OgUrlMismatch,
            evaluate: check_og_self_match,
        },
        PageRule {
            kind: PageIssueKind::MissingCanonical,
            evaluate: check_canonical_present,
        },
        PageRule {
            kind: PageIssueKind::MissingOgUrl,
            evaluate: check_og_url_present,
        },
        PageRule {
            kind: PageIssueKind::MissingXDefault,
            evaluate: check_has_x_default,
        },
        PageRule {
            kind: PageIssueKind::MissingSelfReference,
            evaluate: check_has_self_reference,
        },
    ]
}

/// Returns true for `xx`, `xx-YY` and `x-default`
pub fn is_valid_language_code(tag: &str) -> bool {
    tag == X_DEFAULT || LANGUAGE_CODE_REGEX.is_match(tag)
}

fn check_in_head(_context: &PageContext<'_>, link: &AlternateLink) -> Verdict {
    if link.in_head {
        Verdict::Ok
    } else {
        Verdict::fail("hreflang tag is not inside <head>")
    }
}

fn check_self_referencing(context: &PageContext<'_>, link: &AlternateLink) -> Verdict {
    if link.href == context.current_url {
        Verdict::Ok
    } else {
        Verdict::fail(format!(
            "href '{}' is not self-referencing (current URL: {})",
            link.href, context.current_url
        ))
    }
}

fn check_absolute_url(_context: &PageContext<'_>, link: &AlternateLink) -> Verdict {
    if link.href.is_empty() {
        return Verdict::fail("href is empty");
    }

    match Url::parse(&link.href) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Verdict::Ok,
        _ => Verdict::fail(format!("href '{}' is not an absolute http(s) URL", link.href)),
    }
}

fn check_language_code(_context: &PageContext<'_>, link: &AlternateLink) -> Verdict {
    match link.language_tag.as_deref() {
        None => Verdict::fail("hreflang attribute is missing"),
        Some(tag) if is_valid_language_code(tag) => Verdict::Ok,
        Some(tag) => Verdict::fail(format!("invalid hreflang value '{}'", tag)),
    }
}

fn check_canonical_consistency(context: &PageContext<'_>, link: &AlternateLink) -> Verdict {
    match context.canonical_url {
        None => Verdict::Ok,
        Some(canonical) if link.href == canonical || link.is_x_default() => Verdict::Ok,
        Some(canonical) => Verdict::fail(format!(
            "href '{}' does not match canonical URL {}",
            link.href, canonical
        )),
    }
}

fn check_lang_attribute(context: &PageContext<'_>, link: &AlternateLink) -> Verdict {
    match (context.html_lang, link.language_tag.as_deref()) {
        (Some(html_lang), Some(tag)) if !tag.starts_with(html_lang) => Verdict::fail(format!(
            "hreflang '{}' does not match html lang '{}'",
            tag, html_lang
        )),
        _ => Verdict::Ok,
    }
}

fn check_canonical_self_match(context: &PageContext<'_>) -> Verdict {
    match context.canonical_url {
        Some(canonical) if canonical != context.current_url => Verdict::fail(format!(
            "Canonical URL {} does not match current URL {}",
            canonical, context.current_url
        )),
        _ => Verdict::Ok,
    }
}

fn check_og_self_match(context: &PageContext<'_>) -> Verdict {
    match context.og_url {
        Some(og_url) if og_url != context.current_url => Verdict::fail(format!(
            "og:url {} does not match current URL {}",
            og_url, context.current_url
        )),
        _ => Verdict::Ok,
    }
}

fn check_canonical_present(context: &PageContext<'_>) -> Verdict {
    if context.policy.require_canonical && context.canonical_url.is_none() {
        Verdict::fail("Missing canonical URL")
    } else {
        Verdict::Ok
    }
}

fn check_og_url_present(context: &PageContext<'_>) -> Verdict {
    if context.policy.require_og_url && context.og_url.is_none() {
        Verdict::fail("Missing og:url meta tag")
    } else {
        Verdict::Ok
    }
}

fn check_has_x_default(context: &PageContext<'_>) -> Verdict {
    if context.has_x_default {
        Verdict::Ok
    } else {
        Verdict::fail("Missing x-default hreflang tag")
    }
}

fn check_has_self_reference(context: &PageContext<'_>) -> Verdict {
    if context.has_self_reference {
        Verdict::Ok
    } else {
        Verdict::fail("No self-referencing hreflang tag")
    }
}
