//! Hosting provider signature catalog.
//!
//! A catalog maps a provider id to the ordered list of substrings that mark
//! that provider's error or parked page. Provider order is match priority.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, ScanError};

/// Built-in signatures, in match priority order.
const DEFAULT_PATTERNS: &[(&str, &[&str])] = &[
    (
        "iq",
        &[
            "Error 404 / Błąd 404",
            "https://www.iq.pl/pomoc/29/233",
            "jest utrzymywana na serwerach IQ PL",
            "wildinfo.iq.pl/main.css",
        ],
    ),
    (
        "ovh",
        &[
            "Hosted by OVH",
            "Welcome to OVH",
            "This domain name has been registered with Gandi.net",
            "ovh.com",
        ],
    ),
    (
        "homepl",
        &[
            "Strona utrzymywana na serwerach home.pl",
            "home.pl",
            "Błąd 404",
            "Serwis nie istnieje lub wygasł",
        ],
    ),
    (
        "nazwa",
        &[
            "Strona utrzymywana na serwerach nazwa.pl",
            "nazwa.pl",
            "Domena jest utrzymywana na serwerach nazwa.pl",
            "Domena została zarejestrowana w nazwa.pl",
        ],
    ),
    (
        "gandi",
        &[
            "This domain name has been registered with Gandi.net",
            "Gandi.net",
        ],
    ),
    (
        "hetzner",
        &["Hetzner Online GmbH", "This domain is reserved", "Hetzner"],
    ),
    (
        "godaddy",
        &[
            "This domain is parked",
            "GoDaddy.com, LLC",
            "GoDaddy",
            "Visit GoDaddy.com",
        ],
    ),
    (
        "cloudflare",
        &[
            "This domain is using Cloudflare",
            "cloudflare.com",
            "Error 1001 Ray ID",
        ],
    ),
    (
        "google",
        &[
            "Google Domains",
            "This domain has been registered at Google Domains",
            "domains.google",
        ],
    ),
    (
        "microsoft",
        &[
            "This domain is registered with Microsoft",
            "Azure App Service",
            "azurewebsites.net",
        ],
    ),
    (
        "dreamhost",
        &["DreamHost", "Site Not Found", "The DreamHost customer who owns"],
    ),
    (
        "bluehost",
        &["Bluehost", "This domain is parked", "parked by Bluehost"],
    ),
    (
        "hostgator",
        &["HostGator", "This domain is parked", "parked by HostGator"],
    ),
    (
        "namecheap",
        &["This domain is registered at Namecheap", "Namecheap"],
    ),
    (
        "ionos",
        &["IONOS", "This domain has been registered with IONOS"],
    ),
    (
        "aws",
        &["Amazon Web Services", "aws.amazon.com", "NoSuchBucket"],
    ),
];

/// Ordered provider -> signatures mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatternCatalog {
    providers: IndexMap<String, Vec<String>>,
}

impl Default for PatternCatalog {
    fn default() -> Self {
        let providers = DEFAULT_PATTERNS
            .iter()
            .map(|(provider, signatures)| {
                (
                    provider.to_string(),
                    signatures.iter().map(|s| s.to_string()).collect(),
                )
            })
            .collect();
        Self { providers }
    }
}

impl PatternCatalog {
    pub fn new(providers: IndexMap<String, Vec<String>>) -> Self {
        Self { providers }
    }

    /// Load a catalog, falling back to the built-in one on any failure.
    ///
    /// A missing, unreadable or malformed pattern file is logged and never fatal.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match Self::from_file(path) {
            Ok(catalog) => {
                debug!(
                    path = %path.display(),
                    providers = catalog.len(),
                    "Loaded hosting patterns"
                );
                catalog
            }
            Err(e) => {
                warn!(error = %e, "Falling back to built-in hosting patterns");
                Self::default()
            }
        }
    }

    /// Strict loader used by [`PatternCatalog::load`].
    pub fn from_file(path: &Path) -> Result<Self> {
        let pattern_error = |reason: String| ScanError::PatternFile {
            path: path.to_path_buf(),
            reason,
        };

        let content = std::fs::read_to_string(path).map_err(|e| pattern_error(e.to_string()))?;
        Self::from_json_str(&content).map_err(|e| pattern_error(e.to_string()))
    }

    /// Parse a JSON object of provider id -> array of signature strings.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let providers: IndexMap<String, Vec<String>> = serde_json::from_str(json)?;
        Ok(Self { providers })
    }

    /// Providers and their signatures in priority order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.providers
            .iter()
            .map(|(provider, signatures)| (provider.as_str(), signatures.as_slice()))
    }

    pub fn signatures(&self, provider: &str) -> Option<&[String]> {
        self.providers.get(provider).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
