use crate::http_client::build_http_client;
use crate::models::{AlternateLink, PageMetadata};
use anyhow::Result;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::future::Future;
use thiserror::Error;
use url::Url;

// Cached selectors to avoid repeated parsing and eliminate unwrap() calls
static ALTERNATE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    // Typed alternates without hreflang are feeds or media, not language variants
    Selector::parse("link[rel~='alternate'][hreflang], link[rel~='alternate']:not([type])")
        .expect("alternate link selector should be valid")
});
static CANONICAL_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("link[rel~='canonical']").expect("canonical selector should be valid")
});
static OG_URL_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("meta[property='og:url']").expect("og:url selector should be valid")
});
static HTML_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("html").expect("html selector should be valid"));

/// Why a page's metadata could not be produced
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request timed out")]
    Timeout,

    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("HTTP status {status}")]
    HttpStatus { status: u16 },

    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),
}

impl From<reqwest::Error> for ExtractionError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            ExtractionError::Timeout
        } else {
            ExtractionError::Request(error)
        }
    }
}

/// Produces `PageMetadata` for a URL. "No hreflang tags" is valid metadata with
/// an empty link list, never an error.
pub trait MetadataSource {
    fn extract(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<PageMetadata, ExtractionError>> + Send;
}

impl<T: MetadataSource> MetadataSource for &T {
    fn extract(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<PageMetadata, ExtractionError>> + Send {
        (**self).extract(url)
    }
}

/// Loads pages over HTTP and reads their markup
pub struct HttpExtractor {
    client: reqwest::Client,
}

impl HttpExtractor {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            client: build_http_client(timeout_secs)?,
        })
    }
}

impl MetadataSource for HttpExtractor {
    async fn extract(&self, url: &str) -> Result<PageMetadata, ExtractionError> {
        let parsed = Url::parse(url).map_err(|e| ExtractionError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ExtractionError::InvalidUrl {
                url: url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let response = self.client.get(parsed).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ExtractionError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let current_url = response.url().to_string();

        if let Some(content_type) = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
        {
            let ct_lower = content_type.to_lowercase();
            if !ct_lower.contains("text/html") && !ct_lower.contains("application/xhtml") {
                tracing::warn!(
                    url = %url,
                    content_type = %content_type,
                    "Non-HTML content type detected, parsing may fail"
                );
            }
        }

        let html = response.text().await.map_err(ExtractionError::Body)?;

        if current_url != url {
            tracing::debug!(url = %url, current_url = %current_url, "Page was redirected");
        }

        Ok(parse_metadata(&html, url, &current_url))
    }
}

/// Reads hreflang, canonical, og:url and lang metadata out of an HTML document
pub fn parse_metadata(html: &str, page_url: &str, current_url: &str) -> PageMetadata {
    let document = Html::parse_document(html);
    let base_url = Url::parse(current_url).ok();

    PageMetadata {
        page_url: page_url.to_string(),
        current_url: current_url.to_string(),
        html_lang: extract_html_lang(&document),
        canonical_url: extract_canonical(&document, base_url.as_ref()),
        og_url: extract_og_url(&document),
        alternate_links: extract_alternate_links(&document),
    }
}

fn extract_alternate_links(document: &Html) -> Vec<AlternateLink> {
    document
        .select(&ALTERNATE_SELECTOR)
        .map(|element| AlternateLink {
            language_tag: element.value().attr("hreflang").map(|s| s.to_string()),
            href: element.value().attr("href").unwrap_or_default().to_string(),
            in_head: is_in_head(&element),
        })
        .collect()
}

fn is_in_head(element: &ElementRef<'_>) -> bool {
    element
        .parent()
        .and_then(ElementRef::wrap)
        .is_some_and(|parent| parent.value().name() == "head")
}

/// Resolves the canonical href against the page, like a browser's `link.href`
fn extract_canonical(document: &Html, base_url: Option<&Url>) -> Option<String> {
    let href = document
        .select(&CANONICAL_SELECTOR)
        .next()
        .and_then(|el| el.value().attr("href"))?
        .trim();

    match base_url.map(|base| base.join(href)) {
        Some(Ok(resolved)) => Some(resolved.to_string()),
        _ => Some(href.to_string()),
    }
}

fn extract_og_url(document: &Html) -> Option<String> {
    document
        .select(&OG_URL_SELECTOR)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

fn extract_html_lang(document: &Html) -> Option<String> {
    document
        .select(&HTML_SELECTOR)
        .next()
        .and_then(|el| el.value().attr("lang"))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}
