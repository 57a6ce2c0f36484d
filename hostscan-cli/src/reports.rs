use std::path::{Path, PathBuf};

use colored::Colorize;
use hostscan_core::colors::{paint_category, PaletteExt};
use hostscan_core::report::{render_summary, summarize, write_report};
use hostscan_core::{ReportFormat, ScanResult};
use tracing::{error, info};

/// Where each artifact goes inside the results directory.
#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub csv: PathBuf,
    pub md: PathBuf,
    pub html: PathBuf,
    pub json: Option<PathBuf>,
    pub summary: PathBuf,
}

impl ReportPaths {
    /// Keep only the file name of each requested path and place it in `dir`.
    pub fn within(
        dir: &Path,
        csv: &Path,
        md: &Path,
        html: &Path,
        json: Option<&Path>,
    ) -> Self {
        let place = |p: &Path| dir.join(p.file_name().unwrap_or(p.as_os_str()));
        Self {
            csv: place(csv),
            md: place(md),
            html: place(html),
            json: json.map(place),
            summary: dir.join("summary.txt"),
        }
    }
}

/// Write every report. Failures are logged per artifact and never stop the others.
pub fn write_all(results: &[ScanResult], paths: &ReportPaths) {
    let mut targets = vec![
        (ReportFormat::Csv, &paths.csv),
        (ReportFormat::Markdown, &paths.md),
        (ReportFormat::Html, &paths.html),
    ];
    if let Some(json) = &paths.json {
        targets.push((ReportFormat::Json, json));
    }

    for (format, path) in targets {
        if let Err(e) = write_report(format, results, path) {
            error!(error = %e, "Report failed");
            eprintln!("{}", format!("Error: {}", e).server_error());
        }
    }

    write_summary(results, &paths.summary);
}

fn write_summary(results: &[ScanResult], path: &Path) {
    let summary = summarize(results);

    println!("{}", "\nSummary:".bold());
    for (category, count) in &summary {
        let line = format!("{}: {}", category, count);
        println!("{}", paint_category(category, &line));
        info!("Summary: {}", line);
    }

    if let Err(e) = std::fs::write(path, render_summary(&summary)) {
        error!(path = %path.display(), error = %e, "Failed to write summary file");
    }
}
