//! Response body classification.
//!
//! Classification is first-match: providers are tried in catalog order and,
//! within a provider, signatures in list order. The first signature found as a
//! case-sensitive substring of the body decides the category. Extra heuristics
//! plug in as [`ClassifierStrategy`] values and run after the catalog, before
//! the generic status-code fallback.

use std::fmt;
use std::sync::Arc;

use crate::patterns::PatternCatalog;

pub const NO_ERROR: &str = "no_error";
pub const UNREACHABLE: &str = "unreachable";
pub const DRY_RUN: &str = "dry_run";
pub const CUSTOM: &str = "custom";

/// Status codes looked for in an otherwise unrecognized body, in priority order.
const FALLBACK_CODES: [&str; 5] = ["404", "500", "403", "502", "503"];

/// Additional detection step consulted when no catalog signature matches.
pub trait ClassifierStrategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Returns a category for the body, or `None` to defer to the next step.
    fn detect(&self, body: &str) -> Option<String>;
}

/// Catalog lookup plus an ordered strategy chain.
#[derive(Clone)]
pub struct Classifier {
    catalog: Arc<PatternCatalog>,
    strategies: Vec<Arc<dyn ClassifierStrategy>>,
}

impl fmt::Debug for Classifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.strategies.iter().map(|s| s.name()).collect();
        f.debug_struct("Classifier")
            .field("providers", &self.catalog.len())
            .field("strategies", &names)
            .finish()
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(Arc::new(PatternCatalog::default()))
    }
}

impl Classifier {
    pub fn new(catalog: Arc<PatternCatalog>) -> Self {
        Self {
            catalog,
            strategies: Vec::new(),
        }
    }

    /// Append a strategy to the end of the chain.
    pub fn with_strategy(mut self, strategy: impl ClassifierStrategy + 'static) -> Self {
        self.strategies.push(Arc::new(strategy));
        self
    }

    pub fn catalog(&self) -> &PatternCatalog {
        &self.catalog
    }

    pub fn classify(&self, body: &str) -> String {
        if let Some(category) = match_provider(body, &self.catalog) {
            return category;
        }

        for strategy in &self.strategies {
            if let Some(category) = strategy.detect(body) {
                tracing::debug!(strategy = strategy.name(), %category, "Strategy matched");
                return category;
            }
        }

        status_fallback(body)
    }
}

/// Classify with the catalog alone (empty strategy chain).
pub fn classify(body: &str, catalog: &PatternCatalog) -> String {
    match_provider(body, catalog).unwrap_or_else(|| status_fallback(body))
}

fn match_provider(body: &str, catalog: &PatternCatalog) -> Option<String> {
    catalog
        .iter()
        .find(|(_, signatures)| signatures.iter().any(|sig| body.contains(sig.as_str())))
        .map(|(provider, _)| format!("{}_error", provider))
}

fn status_fallback(body: &str) -> String {
    FALLBACK_CODES
        .iter()
        .find(|code| body.contains(*code))
        .map(|code| format!("{}_{}", CUSTOM, code))
        .unwrap_or_else(|| CUSTOM.to_string())
}
