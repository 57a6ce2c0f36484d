mod display;
mod logging;
mod reports;
mod scan;

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use hostscan_core::progress::DEFAULT_PROGRESS_FILE;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "hostscan")]
#[command(
    about = "Scan domains for 4xx/5xx errors and detect error/parked pages for many hostings"
)]
#[command(version)]
struct Cli {
    /// Simulate run without making any HTTP requests
    #[arg(long)]
    dry_run: bool,

    /// Input file with list of domains
    #[arg(long, default_value = "domains.txt")]
    input: PathBuf,

    /// Output CSV file name
    #[arg(long, default_value = "scan_results.csv")]
    csv: PathBuf,

    /// Output Markdown file name
    #[arg(long, default_value = "scan_results.md")]
    md: PathBuf,

    /// Output HTML file name
    #[arg(long, default_value = "scan_results.html")]
    html: PathBuf,

    /// Output JSON file name (skipped when not given)
    #[arg(long)]
    json: Option<PathBuf>,

    /// Minimum delay between requests (seconds)
    #[arg(long, default_value_t = 60)]
    delay_min: u64,

    /// Maximum delay between requests (seconds)
    #[arg(long, default_value_t = 180)]
    delay_max: u64,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    log_level: LogLevel,

    /// Path to JSON file with hosting error/parked page patterns
    #[arg(long)]
    patterns: Option<PathBuf>,

    /// Also log to console
    #[arg(long)]
    log_console: bool,

    /// Number of parallel workers
    #[arg(long, default_value_t = 1)]
    threads: usize,

    /// Skip delay between requests
    #[arg(long)]
    no_delay: bool,

    /// Only scan domains not present in previous results
    #[arg(long)]
    only_unscanned: bool,

    /// Only output domains with errors (not no_error)
    #[arg(long)]
    errors_only: bool,

    /// Limit the number of domains to scan
    #[arg(long)]
    max_domains: Option<usize>,

    /// Timeout for HTTP requests (seconds)
    #[arg(long, default_value_t = 5)]
    timeout: u64,

    /// Number of retries for failed requests
    #[arg(long, default_value_t = 2)]
    retries: usize,

    /// Progress file used to resume interrupted scans
    #[arg(long, default_value = DEFAULT_PROGRESS_FILE)]
    progress: PathBuf,

    /// Resume from an existing progress file without asking
    #[arg(short, long)]
    yes: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let code = scan::execute(cli).await?;
    std::process::exit(code);
}
