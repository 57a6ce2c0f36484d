use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::types::FetchedPage;
use crate::error::{Result, ScanError};

/// Browser user agents rotated across attempts.
pub const USER_AGENTS: [&str; 5] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:124.0) Gecko/20100101 Firefox/124.0",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_2 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1",
];

/// Network seam for the prober.
///
/// `Ok` means a response arrived (any status). `Err` means the request never
/// completed and may be retried.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str, user_agent: &str, timeout: Duration) -> Result<FetchedPage>;
}

/// reqwest-backed fetcher. Redirects follow reqwest's default policy.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, user_agent: &str, timeout: Duration) -> Result<FetchedPage> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, user_agent)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| network_error(url, e))?;

        let status = response.status().as_u16();
        debug!(url = %url, status, "Received response");

        let body = response.text().await.map_err(|e| network_error(url, e))?;

        Ok(FetchedPage { status, body })
    }
}

fn network_error(url: &str, error: reqwest::Error) -> ScanError {
    if error.is_timeout() {
        ScanError::Timeout(format!("{}: {}", url, error))
    } else if error.is_connect() {
        ScanError::Connection(format!("{}: {}", url, error))
    } else {
        ScanError::Http(error)
    }
}
