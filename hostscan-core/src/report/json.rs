use super::ReportRenderer;
use crate::probe::ScanResult;

/// Pretty-printed array in the same shape as the progress file.
pub struct JsonRenderer;

impl ReportRenderer for JsonRenderer {
    fn render(&self, results: &[ScanResult]) -> String {
        serde_json::to_string_pretty(results)
            .unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
    }
}
