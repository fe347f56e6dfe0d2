use crate::aggregator::ReportAggregator;
use crate::extractor::MetadataSource;
use crate::models::{AuditReport, PageAuditResult};
use crate::rules::RuleEngine;
use futures::stream::{self, StreamExt};
use governor::{
    Quota, RateLimiter, clock::DefaultClock, state::InMemoryState, state::direct::NotKeyed,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::num::NonZeroU32;
use std::time::Duration;

/// Configuration for the audit loop
pub struct AuditorConfig {
    /// Pages loaded at once; 1 loads strictly one page after another
    pub concurrency: usize,
    pub requests_per_second: Option<f64>,
}

impl Default for AuditorConfig {
    fn default() -> Self {
        Self {
            concurrency: 1,
            requests_per_second: None,
        }
    }
}

/// Quota for a requests-per-second rate. Whole rates allow a burst of that many
/// requests; fractional rates space requests evenly, so 0.5 is one every 2s.
pub fn rate_limit_quota(requests_per_second: f64) -> Option<Quota> {
    if !requests_per_second.is_finite() || requests_per_second <= 0.0 {
        return None;
    }

    if requests_per_second.fract() == 0.0 && requests_per_second <= u32::MAX as f64 {
        return NonZeroU32::new(requests_per_second as u32).map(Quota::per_second);
    }

    Duration::try_from_secs_f64(1.0 / requests_per_second)
        .ok()
        .and_then(Quota::with_period)
}

pub struct Auditor<S> {
    source: S,
    engine: RuleEngine,
    concurrency: usize,
    rate_limiter: Option<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
    progress_bar: Option<ProgressBar>,
}

impl<S: MetadataSource> Auditor<S> {
    pub fn new(source: S, engine: RuleEngine, config: AuditorConfig) -> Self {
        let rate_limiter = config
            .requests_per_second
            .and_then(rate_limit_quota)
            .map(RateLimiter::direct);

        Self {
            source,
            engine,
            concurrency: config.concurrency.max(1),
            rate_limiter,
            progress_bar: None,
        }
    }

    /// Enable progress bar for auditing
    pub fn enable_progress_bar(&mut self, total: usize) {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} pages")
                .expect("Progress bar template should be valid"),
        );
        self.progress_bar = Some(pb);
    }

    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    /// Audits every URL and returns the finished report. Results are folded in
    /// URL order whatever the concurrency.
    pub async fn run(&self, urls: &[String]) -> AuditReport {
        let mut aggregator = ReportAggregator::new(self.engine.version(), self.engine.columns());

        let mut results = stream::iter(urls)
            .map(|url| self.audit_url(url))
            .buffered(self.concurrency);

        while let Some(result) = results.next().await {
            aggregator.add_page(&result);

            if let Some(ref pb) = self.progress_bar {
                pb.set_position(aggregator.urls_checked() as u64);
            }
        }

        if let Some(ref pb) = self.progress_bar {
            pb.finish_with_message(format!("Audited {} pages", aggregator.urls_checked()));
        }

        aggregator.finalize()
    }

    pub async fn audit_url(&self, url: &str) -> PageAuditResult {
        // Wait for rate limiter before loading the page
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        tracing::info!(url = %url, "Checking page");

        match self.source.extract(url).await {
            Ok(metadata) => {
                let result = self.engine.evaluate(&metadata);
                tracing::debug!(
                    url = %url,
                    tags = result.tags.len(),
                    issues = result.issues.len(),
                    "Page evaluated"
                );
                result
            }
            Err(e) => {
                tracing::error!(url = %url, error = %e, "Failed to load page");
                PageAuditResult::extraction_failed(url, &e)
            }
        }
    }
}
