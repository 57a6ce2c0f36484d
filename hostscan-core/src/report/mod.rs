//! Report renderers
//!
//! Each renderer turns the final result list into one artifact. Renderers are
//! independent: a failing write is reported for that artifact only.

mod json;
mod summary;
mod table;

pub use json::JsonRenderer;
pub use summary::{render_summary, summarize, Summary};
pub use table::{CsvRenderer, HtmlRenderer, MarkdownRenderer};

use std::path::Path;

use tracing::info;

use crate::error::{Result, ScanError};
use crate::probe::ScanResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    Markdown,
    Html,
    Json,
}

impl ReportFormat {
    pub fn name(&self) -> &'static str {
        match self {
            ReportFormat::Csv => "CSV",
            ReportFormat::Markdown => "Markdown",
            ReportFormat::Html => "HTML",
            ReportFormat::Json => "JSON",
        }
    }
}

pub trait ReportRenderer {
    fn render(&self, results: &[ScanResult]) -> String;
}

pub fn get_renderer(format: ReportFormat) -> Box<dyn ReportRenderer> {
    match format {
        ReportFormat::Csv => Box::new(CsvRenderer),
        ReportFormat::Markdown => Box::new(MarkdownRenderer),
        ReportFormat::Html => Box::new(HtmlRenderer),
        ReportFormat::Json => Box::new(JsonRenderer),
    }
}

/// Render `results` and write them to `path`.
pub fn write_report(format: ReportFormat, results: &[ScanResult], path: &Path) -> Result<()> {
    let content = get_renderer(format).render(results);
    std::fs::write(path, content).map_err(|source| ScanError::Report {
        format: format.name(),
        path: path.to_path_buf(),
        source,
    })?;
    info!(format = format.name(), path = %path.display(), "Results written");
    Ok(())
}

/// Text shown for a status code cell when there is none.
fn status_cell(status: Option<u16>, missing: &str) -> String {
    status.map_or_else(|| missing.to_string(), |s| s.to_string())
}
