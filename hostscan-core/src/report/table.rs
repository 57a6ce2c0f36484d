use std::fmt::Write;

use super::{status_cell, ReportRenderer};
use crate::probe::ScanResult;

/// `domain,status_code,category` with RFC 4180 quoting.
pub struct CsvRenderer;

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

impl ReportRenderer for CsvRenderer {
    fn render(&self, results: &[ScanResult]) -> String {
        let mut out = String::from("domain,status_code,category\r\n");
        for r in results {
            let _ = write!(
                out,
                "{},{},{}\r\n",
                csv_field(r.domain.as_str()),
                status_cell(r.status_code, ""),
                csv_field(&r.category)
            );
        }
        out
    }
}

pub struct MarkdownRenderer;

impl ReportRenderer for MarkdownRenderer {
    fn render(&self, results: &[ScanResult]) -> String {
        let mut out = String::new();
        out.push_str("| Domain | Status Code | Category |\n");
        out.push_str("|--------|-------------|----------|\n");
        for r in results {
            let _ = writeln!(
                out,
                "| {} | {} | {} |",
                r.domain,
                status_cell(r.status_code, "None"),
                r.category.replace('|', "\\|")
            );
        }
        out
    }
}

pub struct HtmlRenderer;

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

impl ReportRenderer for HtmlRenderer {
    fn render(&self, results: &[ScanResult]) -> String {
        let mut out = String::from(
            "<html><head><title>Scan Results</title></head><body><table border='1'>",
        );
        out.push_str("<tr><th>Domain</th><th>Status Code</th><th>Category</th></tr>");
        for r in results {
            let _ = write!(
                out,
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_html(r.domain.as_str()),
                status_cell(r.status_code, "None"),
                escape_html(&r.category)
            );
        }
        out.push_str("</table></body></html>");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::domain;

    fn results() -> Vec<ScanResult> {
        vec![
            ScanResult::new(domain("example.com"), Some(404), "custom_404"),
            ScanResult::unreachable(domain("down.org")),
        ]
    }

    #[test]
    fn test_csv() {
        let csv = CsvRenderer.render(&results());
        assert_eq!(
            csv,
            "domain,status_code,category\r\nexample.com,404,custom_404\r\ndown.org,,unreachable\r\n"
        );
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_markdown() {
        let md = MarkdownRenderer.render(&results());
        let lines: Vec<&str> = md.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[2], "| example.com | 404 | custom_404 |");
        assert_eq!(lines[3], "| down.org | None | unreachable |");
    }

    #[test]
    fn test_html_escapes_cells() {
        let html = HtmlRenderer.render(&[ScanResult::new(
            domain("example.com"),
            Some(500),
            "<script>_error",
        )]);
        assert!(html.contains("<td>&lt;script&gt;_error</td>"));
        assert!(html.contains("<td>500</td>"));
        assert!(html.ends_with("</table></body></html>"));
    }
}
