use std::time::Duration;

use rand::seq::SliceRandom;
use tracing::{error, info, instrument, warn};

use super::client::{Fetcher, HttpFetcher, USER_AGENTS};
use super::types::{FetchedPage, ScanResult};
use crate::classify::{Classifier, NO_ERROR};
use crate::error::Result;
use crate::retry::{RetryExecutor, RetryPolicy};
use crate::validation::Domain;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_RETRIES: usize = 2;
const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);

/// Per-probe settings
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Skip all network I/O and report `dry_run`
    pub dry_run: bool,
    /// Retries per candidate URL after the first attempt
    pub retries: usize,
    /// Per-request timeout
    pub timeout: Duration,
    /// Pause after the first failed attempt; doubles on each further failure
    pub backoff: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            retries: DEFAULT_RETRIES,
            timeout: DEFAULT_TIMEOUT,
            backoff: DEFAULT_BACKOFF,
        }
    }
}

impl ProbeConfig {
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_retries(mut self, retries: usize) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }
}

/// URLs to try for a target, in order.
///
/// A target that already names its scheme is tried as-is; a bare domain is
/// tried over HTTPS first, then HTTP.
pub fn candidate_urls(target: &str) -> Vec<String> {
    let target = target.trim();
    if target.starts_with("http://") || target.starts_with("https://") {
        vec![target.to_string()]
    } else {
        vec![format!("https://{}", target), format!("http://{}", target)]
    }
}

fn random_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

/// Probes domains and classifies what comes back.
#[derive(Debug)]
pub struct Prober<F: Fetcher = HttpFetcher> {
    fetcher: F,
    classifier: Classifier,
    config: ProbeConfig,
    retry: RetryExecutor,
}

impl Prober<HttpFetcher> {
    /// Prober over a real HTTP client
    pub fn http(classifier: Classifier, config: ProbeConfig) -> Result<Self> {
        Ok(Self::new(HttpFetcher::new()?, classifier, config))
    }
}

impl<F: Fetcher> Prober<F> {
    pub fn new(fetcher: F, classifier: Classifier, config: ProbeConfig) -> Self {
        let policy = RetryPolicy::new(config.retries, config.backoff);
        Self {
            fetcher,
            classifier,
            config,
            retry: RetryExecutor::new(policy),
        }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Probe one domain. Never fails: every outcome is encoded in the category.
    #[instrument(skip(self), fields(domain = %domain))]
    pub async fn probe(&self, domain: &Domain) -> ScanResult {
        let urls = candidate_urls(domain.as_str());

        if self.config.dry_run {
            if let Some(url) = urls.first() {
                info!(url = %url, "[DRY RUN] Would scan");
            }
            return ScanResult::dry_run(domain.clone());
        }

        for url in &urls {
            match self.fetch_with_retry(url).await {
                Ok(page) => {
                    let category = self.categorize(&page);
                    if page.is_error_status() {
                        info!(status = page.status, %category, "Returned error");
                    } else {
                        info!(status = page.status, "Returned status (no error)");
                    }
                    return ScanResult::new(domain.clone(), Some(page.status), category);
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "Unreachable over this URL");
                }
            }
        }

        error!(
            attempts = self.config.retries + 1,
            "Unreachable on every candidate URL"
        );
        ScanResult::unreachable(domain.clone())
    }

    fn categorize(&self, page: &FetchedPage) -> String {
        if page.is_error_status() {
            self.classifier.classify(&page.body)
        } else {
            NO_ERROR.to_string()
        }
    }

    async fn fetch_with_retry(&self, url: &str) -> Result<FetchedPage> {
        let timeout = self.config.timeout;
        self.retry
            .execute(move |attempt| async move {
                let user_agent = random_user_agent();
                info!(url = %url, attempt = attempt + 1, "Scanning");
                self.fetcher.fetch(url, user_agent, timeout).await
            })
            .await
    }
}
