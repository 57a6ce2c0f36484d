//! Domain probing
//!
//! Fetches a domain over HTTPS with HTTP fallback, retrying network failures
//! with exponential backoff, and classifies error responses.

mod client;
mod prober;
mod types;

pub use client::{Fetcher, HttpFetcher, USER_AGENTS};
pub use prober::{candidate_urls, ProbeConfig, Prober};
pub use types::{FetchedPage, ScanResult};
