//! Domain validation and input file parsing

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, ScanError};

const MAX_LABEL_LEN: usize = 63;
const MIN_TLD_LEN: usize = 2;

/// A domain name that passed [`validate_domain`].
///
/// Serialized as a bare string so progress files and JSON reports stay flat.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Domain(String);

impl Domain {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Domain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Validate a candidate domain name
///
/// The candidate is trimmed but otherwise kept as written. It is rejected when:
/// - it carries a scheme prefix (`http://...`)
/// - it contains characters outside `[A-Za-z0-9-.]`
/// - any label is empty, longer than 63 characters, or starts/ends with `-`
/// - it has fewer than two labels
/// - the final label is not purely alphabetic with at least two characters
pub fn validate_domain(raw: &str) -> Result<Domain> {
    let domain = raw.trim();
    let reject = || ScanError::InvalidDomain(domain.to_string());

    if domain.is_empty() || domain.contains("://") {
        return Err(reject());
    }

    let valid_chars = domain
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
    if !valid_chars {
        return Err(reject());
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return Err(reject());
    }

    for label in &labels {
        if label.is_empty()
            || label.len() > MAX_LABEL_LEN
            || label.starts_with('-')
            || label.ends_with('-')
        {
            return Err(reject());
        }
    }

    let Some(tld) = labels.last() else {
        return Err(reject());
    };
    if tld.len() < MIN_TLD_LEN || !tld.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(reject());
    }

    Ok(Domain(domain.to_string()))
}

/// Result of parsing a domain list: accepted domains plus rejected raw lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDomains {
    pub valid: Vec<Domain>,
    pub rejected: Vec<String>,
}

/// Parse a newline-delimited domain list.
///
/// Blank lines are ignored. Invalid entries are skipped with a warning and
/// collected in [`ParsedDomains::rejected`]; input order is preserved.
pub fn parse_domains(content: &str) -> ParsedDomains {
    let mut parsed = ParsedDomains::default();

    for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match validate_domain(line) {
            Ok(domain) => parsed.valid.push(domain),
            Err(_) => {
                warn!(domain = %line, "Invalid domain skipped");
                parsed.rejected.push(line.to_string());
            }
        }
    }

    parsed
}

/// Read and parse a domain list from disk. An unreadable file is fatal.
pub fn read_domains(path: impl AsRef<Path>) -> Result<ParsedDomains> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ScanError::InputFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_domains(&content))
}
