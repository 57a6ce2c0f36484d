pub mod classify;
pub mod colors;
pub mod error;
pub mod patterns;
pub mod probe;
pub mod progress;
pub mod report;
pub mod retry;
pub mod scan;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{Result, ScanError};
pub use validation::{parse_domains, read_domains, validate_domain, Domain, ParsedDomains};

pub use classify::{classify, Classifier, ClassifierStrategy};
pub use patterns::PatternCatalog;
pub use probe::{Fetcher, HttpFetcher, ProbeConfig, Prober, ScanResult};
pub use progress::ProgressStore;
pub use scan::{filter_errors_only, DelayRange, ScanConfig, ScanOutcome, Scanner};

pub use report::{ReportFormat, ReportRenderer};

pub use tokio_util::sync::CancellationToken;
