use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::Local;
use colored::Colorize;
use dialoguer::Confirm;
use hostscan_core::colors::{result_line, PaletteExt};
use hostscan_core::scan::ProgressCallback;
use hostscan_core::{
    filter_errors_only, read_domains, CancellationToken, Classifier, DelayRange, PatternCatalog,
    ProbeConfig, Prober, ProgressStore, ScanConfig, ScanOutcome, ScanResult, Scanner,
};
use tracing::{info, warn};

use crate::display::ScanProgressBar;
use crate::reports::{self, ReportPaths};
use crate::Cli;

fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let mins = (total_secs % 3600) / 60;
    let secs = total_secs % 60;
    if hours > 0 {
        format!("{}h {}m {}s", hours, mins, secs)
    } else if mins > 0 {
        format!("{}m {}s", mins, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Run a full scan from the command line. Returns the process exit code.
pub async fn execute(cli: Cli) -> anyhow::Result<i32> {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let results_dir = PathBuf::from(format!("scan_results_{}", timestamp));
    std::fs::create_dir_all(&results_dir)
        .with_context(|| format!("creating {}", results_dir.display()))?;

    crate::logging::init(
        cli.log_level.as_filter(),
        &results_dir.join(format!("scan_log_{}.log", timestamp)),
        cli.log_console,
    )?;

    let catalog = Arc::new(PatternCatalog::load(cli.patterns.as_deref()));

    let parsed = match read_domains(&cli.input) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::error!(error = %e, "Cannot read input");
            eprintln!("{}", format!("Error: {}", e).server_error());
            return Ok(1);
        }
    };
    for rejected in &parsed.rejected {
        println!("{}", format!("Skipping invalid domain: {}", rejected).notice());
    }
    let domains = parsed.valid;

    let probe_config = ProbeConfig::default()
        .with_dry_run(cli.dry_run)
        .with_retries(cli.retries)
        .with_timeout(Duration::from_secs(cli.timeout));
    let prober = Prober::http(Classifier::new(catalog), probe_config)?;

    let scan_config = ScanConfig::default()
        .with_threads(cli.threads)
        .with_delay(DelayRange::new(cli.delay_min, cli.delay_max))
        .with_no_delay(cli.no_delay)
        .with_only_unscanned(cli.only_unscanned)
        .with_max_domains(cli.max_domains);

    let scanner = Scanner::new(prober, ProgressStore::new(&cli.progress), scan_config);

    let prior = resume_prior(&scanner, cli.yes).await?;
    let scanned: HashSet<_> = prior.iter().map(|r| r.domain.clone()).collect();
    let pending = scanner.work_list(&domains, &scanned).len();

    match scanner.config().estimated_duration(pending, cli.dry_run) {
        Some(estimate) => println!(
            "{}",
            format!(
                "Estimated scan time for {} domains with {} thread(s): {}",
                pending,
                scanner.config().threads,
                format_duration(estimate)
            )
            .info()
        ),
        None => println!("{}", "Estimated scan time: <1s (dry-run or no-delay mode)".info()),
    }

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let bar = ScanProgressBar::new(pending);
    let reporter = bar.clone();
    let progress: ProgressCallback = Box::new(move |completed, _total, result: &ScanResult| {
        reporter.record(completed, &result_line(result).to_string());
    });

    let outcome = scanner.run(&domains, prior, &cancel, Some(progress)).await;
    bar.finish();

    let results = match outcome {
        ScanOutcome::Interrupted(results) => {
            warn!(saved = results.len(), "Scan interrupted by user");
            println!("{}", "\nScan interrupted by user. Saving progress...".server_error());
            println!(
                "{}",
                format!(
                    "Progress saved to {}. You can resume later.",
                    scanner.store().path().display()
                )
                .notice()
            );
            return Ok(0);
        }
        ScanOutcome::Completed(results) => results,
    };

    let output = if cli.errors_only {
        filter_errors_only(&results)
    } else {
        results
    };

    let paths = ReportPaths::within(
        &results_dir,
        &cli.csv,
        &cli.md,
        &cli.html,
        cli.json.as_deref(),
    );
    reports::write_all(&output, &paths);

    if let Err(e) = scanner.store().clear().await {
        warn!(error = %e, "Could not remove progress file");
    }

    info!(dir = %results_dir.display(), "Scan completed");
    println!(
        "{}",
        format!("Results saved in {}", results_dir.display()).bold()
    );
    Ok(0)
}

/// Ask whether to resume from an existing progress file.
async fn resume_prior<F: hostscan_core::Fetcher>(
    scanner: &Scanner<F>,
    assume_yes: bool,
) -> anyhow::Result<Vec<ScanResult>> {
    let store = scanner.store();
    if !store.exists() {
        return Ok(Vec::new());
    }

    println!(
        "{}",
        format!("Found progress file: {}", store.path().display()).notice()
    );

    let resume = assume_yes
        || Confirm::new()
            .with_prompt("Resume previous scan?")
            .default(true)
            .interact()
            .context("reading resume answer")?;

    if !resume {
        println!(
            "{}",
            "Starting a new scan. Previous progress will be overwritten.".notice()
        );
        return Ok(Vec::new());
    }

    let prior = store.load().await;
    println!(
        "{}",
        format!("Resuming scan. {} domains already scanned.", prior.len()).notice()
    );
    Ok(prior)
}
