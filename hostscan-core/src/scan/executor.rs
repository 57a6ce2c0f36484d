use std::collections::HashSet;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use rand::Rng;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::probe::{Fetcher, HttpFetcher, Prober, ScanResult};
use crate::progress::ProgressStore;
use crate::validation::Domain;

/// Called after every completed probe with `(completed, total, result)`.
pub type ProgressCallback = Box<dyn Fn(usize, usize, &ScanResult) + Send + Sync>;

/// Inclusive range of whole seconds to pause between sequential probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    pub min_secs: u64,
    pub max_secs: u64,
}

impl Default for DelayRange {
    fn default() -> Self {
        Self {
            min_secs: 60,
            max_secs: 180,
        }
    }
}

impl DelayRange {
    pub fn new(min_secs: u64, max_secs: u64) -> Self {
        Self {
            min_secs: min_secs.min(max_secs),
            max_secs: min_secs.max(max_secs),
        }
    }

    /// Uniformly random whole-second delay within the range.
    pub fn sample(&self) -> Duration {
        let secs = rand::thread_rng().gen_range(self.min_secs..=self.max_secs);
        Duration::from_secs(secs)
    }

    pub fn average(&self) -> Duration {
        Duration::from_secs(self.min_secs) / 2 + Duration::from_secs(self.max_secs) / 2
    }
}

#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Concurrent probes; 1 runs sequentially with the inter-request delay
    pub threads: usize,
    pub delay: DelayRange,
    /// Disable the inter-request delay in sequential mode
    pub no_delay: bool,
    /// Drop already-scanned domains before applying `max_domains`
    pub only_unscanned: bool,
    pub max_domains: Option<usize>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            threads: 1,
            delay: DelayRange::default(),
            no_delay: false,
            only_unscanned: false,
            max_domains: None,
        }
    }
}

impl ScanConfig {
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    pub fn with_delay(mut self, delay: DelayRange) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_no_delay(mut self, no_delay: bool) -> Self {
        self.no_delay = no_delay;
        self
    }

    pub fn with_only_unscanned(mut self, only_unscanned: bool) -> Self {
        self.only_unscanned = only_unscanned;
        self
    }

    pub fn with_max_domains(mut self, max_domains: Option<usize>) -> Self {
        self.max_domains = max_domains;
        self
    }

    /// Rough wall-clock estimate, or `None` when no delay will be applied.
    pub fn estimated_duration(&self, domains: usize, dry_run: bool) -> Option<Duration> {
        if dry_run || self.no_delay {
            return None;
        }
        let threads = self.threads.max(1) as f64;
        let secs = domains as f64 * self.delay.average().as_secs_f64() / threads;
        Some(Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX))
    }
}

/// How a run ended. Both variants carry every result accumulated so far,
/// including resumed ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Completed(Vec<ScanResult>),
    Interrupted(Vec<ScanResult>),
}

impl ScanOutcome {
    pub fn results(&self) -> &[ScanResult] {
        match self {
            ScanOutcome::Completed(results) | ScanOutcome::Interrupted(results) => results,
        }
    }

    pub fn into_results(self) -> Vec<ScanResult> {
        match self {
            ScanOutcome::Completed(results) | ScanOutcome::Interrupted(results) => results,
        }
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(self, ScanOutcome::Interrupted(_))
    }
}

/// Results minus the healthy (`no_error`) ones.
pub fn filter_errors_only(results: &[ScanResult]) -> Vec<ScanResult> {
    results.iter().filter(|r| r.is_error()).cloned().collect()
}

/// Drives a scan: plans the work list, probes with bounded concurrency,
/// persists progress after every completion and honors cancellation.
#[derive(Debug)]
pub struct Scanner<F: Fetcher = HttpFetcher> {
    prober: Prober<F>,
    store: ProgressStore,
    config: ScanConfig,
}

impl<F: Fetcher> Scanner<F> {
    pub fn new(prober: Prober<F>, store: ProgressStore, config: ScanConfig) -> Self {
        Self {
            prober,
            store,
            config,
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn store(&self) -> &ProgressStore {
        &self.store
    }

    /// The domains this run will look at, in input order.
    ///
    /// Duplicates are dropped. With `only_unscanned`, domains in `scanned` are
    /// removed before the `max_domains` cap is applied.
    pub fn plan(&self, domains: &[Domain], scanned: &HashSet<Domain>) -> Vec<Domain> {
        let mut seen = HashSet::new();
        let planned = domains
            .iter()
            .filter(|d| seen.insert(*d))
            .filter(|d| !self.config.only_unscanned || !scanned.contains(*d))
            .cloned();

        match self.config.max_domains {
            Some(max) => planned.take(max).collect(),
            None => planned.collect(),
        }
    }

    /// Domains that still need a probe: the plan minus everything in `scanned`.
    pub fn work_list(&self, domains: &[Domain], scanned: &HashSet<Domain>) -> Vec<Domain> {
        self.plan(domains, scanned)
            .into_iter()
            .filter(|d| !scanned.contains(d))
            .collect()
    }

    fn delay_enabled(&self) -> bool {
        self.config.threads <= 1 && !self.config.no_delay && !self.prober.config().dry_run
    }

    /// Run the scan.
    ///
    /// `prior` holds resumed results: those domains are never probed again and
    /// their results are carried into the outcome unchanged.
    ///
    /// In sequential mode a delay sampled from [`ScanConfig::delay`] follows
    /// every probe except the last one. Cancellation ends a delay at once.
    pub async fn run(
        &self,
        domains: &[Domain],
        prior: Vec<ScanResult>,
        cancel: &CancellationToken,
        progress: Option<ProgressCallback>,
    ) -> ScanOutcome {
        let scanned: HashSet<Domain> = prior.iter().map(|r| r.domain.clone()).collect();
        let work = self.work_list(domains, &scanned);

        let total = work.len();
        let threads = self.config.threads.max(1);
        let delay_enabled = self.delay_enabled();
        let mut results = prior;

        info!(
            total = total,
            resumed = results.len(),
            threads = threads,
            delay = delay_enabled,
            "Starting scan"
        );

        let prober = &self.prober;
        let mut pending = stream::iter(work)
            .map(move |domain| async move { prober.probe(&domain).await })
            .buffer_unordered(threads);

        let mut completed = 0;
        loop {
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return self.interrupt(results).await,
                next = pending.next() => match next {
                    Some(result) => result,
                    None => break,
                },
            };

            completed += 1;
            results.push(result);
            self.persist(&results).await;

            if let (Some(progress), Some(last)) = (progress.as_ref(), results.last()) {
                progress(completed, total, last);
            }

            if delay_enabled && completed < total {
                let delay = self.config.delay.sample();
                debug!(delay_secs = delay.as_secs(), "Sleeping before next request");
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return self.interrupt(results).await,
                    _ = sleep(delay) => {}
                }
            }
        }

        info!(completed = completed, total_results = results.len(), "Scan completed");
        ScanOutcome::Completed(results)
    }

    async fn persist(&self, results: &[ScanResult]) {
        if let Err(e) = self.store.save(results).await {
            error!(error = %e, "Failed to save progress, continuing in memory");
        }
    }

    async fn interrupt(&self, results: Vec<ScanResult>) -> ScanOutcome {
        warn!(saved = results.len(), "Scan interrupted, saving progress");
        self.persist(&results).await;
        ScanOutcome::Interrupted(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::classify::Classifier;
    use crate::error::ScanError;
    use crate::probe::ProbeConfig;
    use crate::test_support::{domain, ScriptedFetcher};

    fn domains(names: &[&str]) -> Vec<Domain> {
        names.iter().map(|n| domain(n)).collect()
    }

    fn fetcher() -> ScriptedFetcher {
        ScriptedFetcher::new()
            .respond("https://ok.com", 200, "welcome")
            .respond("https://parked.com", 404, "This domain is parked")
            .respond("https://broken.com", 500, "500 Internal Server Error")
            .fail("https://plain.com", ScanError::Timeout("slow".into()))
            .respond("http://plain.com", 403, "403 Forbidden")
    }

    fn scanner(
        fetcher: ScriptedFetcher,
        dir: &tempfile::TempDir,
        config: ScanConfig,
    ) -> Scanner<ScriptedFetcher> {
        let probe_config = ProbeConfig::default()
            .with_retries(1)
            .with_backoff(Duration::from_millis(1));
        let prober = Prober::new(fetcher, Classifier::default(), probe_config);
        let store = ProgressStore::new(dir.path().join("progress.json"));
        Scanner::new(prober, store, config.with_no_delay(true))
    }

    fn delayed_scanner(
        fetcher: ScriptedFetcher,
        dir: &tempfile::TempDir,
        config: ScanConfig,
    ) -> Scanner<ScriptedFetcher> {
        let prober = Prober::new(fetcher, Classifier::default(), ProbeConfig::default());
        let store = ProgressStore::new(dir.path().join("progress.json"));
        Scanner::new(prober, store, config)
    }

    fn sorted(mut results: Vec<ScanResult>) -> Vec<ScanResult> {
        results.sort_by(|a, b| a.domain.cmp(&b.domain));
        results
    }

    #[test]
    fn test_delay_range() {
        let range = DelayRange::new(5, 2);
        assert_eq!(range, DelayRange { min_secs: 2, max_secs: 5 });
        for _ in 0..20 {
            let d = range.sample();
            assert!(d >= Duration::from_secs(2) && d <= Duration::from_secs(5));
        }
        assert_eq!(DelayRange::new(60, 180).average(), Duration::from_secs(120));
        assert_eq!(DelayRange::new(1, 2).average(), Duration::from_millis(1500));
    }

    #[test]
    fn test_huge_delay_does_not_overflow() {
        let range = DelayRange::new(u64::MAX, u64::MAX);
        assert_eq!(range.average(), Duration::from_secs(u64::MAX));

        let config = ScanConfig::default().with_delay(range);
        assert_eq!(config.estimated_duration(usize::MAX, false), Some(Duration::MAX));
    }

    #[test]
    fn test_estimated_duration() {
        let config = ScanConfig::default().with_threads(2);
        assert_eq!(
            config.estimated_duration(10, false),
            Some(Duration::from_secs(600))
        );
        assert_eq!(config.estimated_duration(10, true), None);
        assert_eq!(config.with_no_delay(true).estimated_duration(10, false), None);
    }

    #[test]
    fn test_plan_dedupes_and_caps() {
        let dir = tempfile::tempdir().unwrap();
        let input = domains(&["a.com", "b.com", "a.com", "c.com", "d.com"]);
        let scanned: HashSet<Domain> = domains(&["a.com"]).into_iter().collect();

        let plain = scanner(fetcher(), &dir, ScanConfig::default().with_max_domains(Some(2)));
        assert_eq!(plain.plan(&input, &scanned), domains(&["a.com", "b.com"]));

        let unscanned = scanner(
            fetcher(),
            &dir,
            ScanConfig::default()
                .with_only_unscanned(true)
                .with_max_domains(Some(2)),
        );
        assert_eq!(unscanned.plan(&input, &scanned), domains(&["b.com", "c.com"]));

        let all = scanner(fetcher(), &dir, ScanConfig::default());
        assert_eq!(all.plan(&input, &HashSet::new()).len(), 4);
    }

    #[tokio::test]
    async fn test_sequential_run() {
        let dir = tempfile::tempdir().unwrap();
        let scanner = scanner(fetcher(), &dir, ScanConfig::default());
        let input = domains(&["ok.com", "parked.com", "broken.com", "plain.com", "gone.com"]);

        let outcome = scanner
            .run(&input, Vec::new(), &CancellationToken::new(), None)
            .await;

        assert!(!outcome.is_interrupted());
        let categories: Vec<&str> = outcome.results().iter().map(|r| r.category.as_str()).collect();
        assert_eq!(
            categories,
            vec!["no_error", "godaddy_error", "custom_500", "custom_403", "unreachable"]
        );
        assert_eq!(scanner.store().load().await, outcome.results().to_vec());
    }

    #[tokio::test]
    async fn test_progress_persisted_after_each_probe() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress.json");
        let scanner = scanner(fetcher(), &dir, ScanConfig::default());
        let input = domains(&["ok.com", "parked.com", "broken.com"]);

        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let record = seen.clone();
        let callback: ProgressCallback = Box::new(move |completed, total, _| {
            let saved: Vec<ScanResult> =
                serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
            record.lock().unwrap().push((completed, total, saved.len()));
        });

        scanner
            .run(&input, Vec::new(), &CancellationToken::new(), Some(callback))
            .await;

        assert_eq!(*seen.lock().unwrap(), vec![(1, 3, 1), (2, 3, 2), (3, 3, 3)]);
    }

    #[tokio::test]
    async fn test_resume_skips_prior_domains() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = fetcher();
        let scanner = scanner(fetcher.clone(), &dir, ScanConfig::default());
        let input = domains(&["ok.com", "parked.com", "broken.com"]);
        let prior = vec![ScanResult::new(domain("parked.com"), Some(410), "custom")];

        let outcome = scanner
            .run(&input, prior.clone(), &CancellationToken::new(), None)
            .await;

        assert_eq!(fetcher.calls("https://parked.com"), 0);
        let results = outcome.into_results();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0], prior[0]);
        let unique: HashSet<&Domain> = results.iter().map(|r| &r.domain).collect();
        assert_eq!(unique.len(), 3);
    }

    #[tokio::test]
    async fn test_concurrent_matches_sequential() {
        let input = domains(&["ok.com", "parked.com", "broken.com", "plain.com", "gone.com"]);

        let seq_dir = tempfile::tempdir().unwrap();
        let sequential = scanner(fetcher(), &seq_dir, ScanConfig::default())
            .run(&input, Vec::new(), &CancellationToken::new(), None)
            .await;

        let par_dir = tempfile::tempdir().unwrap();
        let concurrent = scanner(
            fetcher().with_latency(Duration::from_millis(5)),
            &par_dir,
            ScanConfig::default().with_threads(4),
        )
        .run(&input, Vec::new(), &CancellationToken::new(), None)
        .await;

        assert_eq!(
            sorted(sequential.into_results()),
            sorted(concurrent.into_results())
        );
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = fetcher();
        let scanner = scanner(fetcher.clone(), &dir, ScanConfig::default());
        let prior = vec![ScanResult::new(domain("ok.com"), Some(200), "no_error")];

        let cancel = CancellationToken::new();
        cancel.cancel();
        let outcome = scanner
            .run(&domains(&["ok.com", "parked.com"]), prior.clone(), &cancel, None)
            .await;

        assert_eq!(outcome, ScanOutcome::Interrupted(prior.clone()));
        assert_eq!(fetcher.total_calls(), 0);
        assert_eq!(scanner.store().load().await, prior);
    }

    #[tokio::test]
    async fn test_cancel_mid_run_keeps_completed_results() {
        let dir = tempfile::tempdir().unwrap();
        let scanner = scanner(
            fetcher().with_latency(Duration::from_millis(10)),
            &dir,
            ScanConfig::default(),
        );
        let input = domains(&["ok.com", "parked.com", "broken.com"]);

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let callback: ProgressCallback = Box::new(move |_, _, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            trigger.cancel();
        });

        let outcome = scanner.run(&input, Vec::new(), &cancel, Some(callback)).await;

        assert!(outcome.is_interrupted());
        assert_eq!(outcome.results().len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(scanner.store().load().await, outcome.results().to_vec());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequential_delay_follows_every_probe_but_the_last() {
        let dir = tempfile::tempdir().unwrap();
        let scanner = delayed_scanner(
            fetcher(),
            &dir,
            ScanConfig::default().with_delay(DelayRange::new(7, 7)),
        );
        let input = domains(&["ok.com", "parked.com", "broken.com"]);

        let start = tokio::time::Instant::now();
        let outcome = scanner
            .run(&input, Vec::new(), &CancellationToken::new(), None)
            .await;
        let elapsed = start.elapsed();

        assert_eq!(outcome.results().len(), 3);
        assert!(elapsed >= Duration::from_secs(14) && elapsed < Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequential_delay_is_sampled_from_range() {
        let dir = tempfile::tempdir().unwrap();
        let scanner = delayed_scanner(
            fetcher(),
            &dir,
            ScanConfig::default().with_delay(DelayRange::new(2, 5)),
        );
        let input = domains(&["ok.com", "parked.com", "broken.com", "ok.com"]);

        let start = tokio::time::Instant::now();
        scanner
            .run(&input, Vec::new(), &CancellationToken::new(), None)
            .await;
        let elapsed = start.elapsed();

        // three unique domains, two pauses of 2..=5s each
        assert!(elapsed >= Duration::from_secs(4) && elapsed < Duration::from_secs(11));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_run_has_no_delay() {
        let dir = tempfile::tempdir().unwrap();
        let scanner = delayed_scanner(
            fetcher(),
            &dir,
            ScanConfig::default()
                .with_threads(3)
                .with_delay(DelayRange::new(7, 7)),
        );
        let input = domains(&["ok.com", "parked.com", "broken.com"]);

        let start = tokio::time::Instant::now();
        let outcome = scanner
            .run(&input, Vec::new(), &CancellationToken::new(), None)
            .await;

        assert_eq!(outcome.results().len(), 3);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_delay_interrupts_at_once() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = fetcher();
        let scanner = delayed_scanner(
            fetcher.clone(),
            &dir,
            ScanConfig::default().with_delay(DelayRange::new(60, 60)),
        );
        let input = domains(&["ok.com", "parked.com"]);

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            sleep(Duration::from_secs(10)).await;
            trigger.cancel();
        });

        let start = tokio::time::Instant::now();
        let outcome = scanner.run(&input, Vec::new(), &cancel, None).await;
        let elapsed = start.elapsed();

        assert!(outcome.is_interrupted());
        assert_eq!(outcome.results().len(), 1);
        assert_eq!(fetcher.calls("https://parked.com"), 0);
        assert!(elapsed >= Duration::from_secs(10) && elapsed < Duration::from_secs(11));
        assert_eq!(scanner.store().load().await, outcome.results().to_vec());
    }

    #[tokio::test]
    async fn test_dry_run_scans_everything_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = fetcher();
        let probe_config = ProbeConfig::default().with_dry_run(true);
        let prober = Prober::new(fetcher.clone(), Classifier::default(), probe_config);
        // Delay stays configured but dry-run turns it off
        let scanner = Scanner::new(
            prober,
            ProgressStore::new(dir.path().join("progress.json")),
            ScanConfig::default(),
        );

        let outcome = scanner
            .run(&domains(&["ok.com", "parked.com"]), Vec::new(), &CancellationToken::new(), None)
            .await;

        assert!(outcome.results().iter().all(|r| r.category == "dry_run"));
        assert_eq!(fetcher.total_calls(), 0);
    }

    #[test]
    fn test_errors_only_is_idempotent() {
        let results = vec![
            ScanResult::new(domain("ok.com"), Some(200), "no_error"),
            ScanResult::new(domain("parked.com"), Some(404), "godaddy_error"),
            ScanResult::unreachable(domain("gone.com")),
            ScanResult::new(domain("fine.com"), Some(301), "no_error"),
        ];

        let once = filter_errors_only(&results);
        assert_eq!(once.len(), 2);
        assert!(once.iter().all(|r| r.category != "no_error"));
        assert_eq!(filter_errors_only(&once), once);
        assert_eq!(filter_errors_only(&results), once);
    }
}
