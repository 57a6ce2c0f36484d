use serde::{Deserialize, Serialize};

use crate::classify::{DRY_RUN, NO_ERROR, UNREACHABLE};
use crate::validation::Domain;

/// Outcome of probing one domain
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanResult {
    /// The domain that was probed
    pub domain: Domain,
    /// HTTP status code, absent when unreachable or in dry-run mode
    pub status_code: Option<u16>,
    /// Classification label (e.g. `no_error`, `godaddy_error`, `custom_404`)
    pub category: String,
}

impl ScanResult {
    pub fn new(domain: Domain, status_code: Option<u16>, category: impl Into<String>) -> Self {
        Self {
            domain,
            status_code,
            category: category.into(),
        }
    }

    pub fn dry_run(domain: Domain) -> Self {
        Self::new(domain, None, DRY_RUN)
    }

    pub fn unreachable(domain: Domain) -> Self {
        Self::new(domain, None, UNREACHABLE)
    }

    /// Everything except a healthy response counts as an error.
    pub fn is_error(&self) -> bool {
        self.category != NO_ERROR
    }
}

/// A completed HTTP exchange, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
}

impl FetchedPage {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 4xx and 5xx responses are classified; everything else is healthy.
    pub fn is_error_status(&self) -> bool {
        (400..600).contains(&self.status)
    }
}
