use indexmap::IndexMap;

use crate::probe::ScanResult;

/// Category -> count, in order of first appearance.
pub type Summary = IndexMap<String, usize>;

pub fn summarize(results: &[ScanResult]) -> Summary {
    let mut summary = Summary::new();
    for r in results {
        *summary.entry(r.category.clone()).or_default() += 1;
    }
    summary
}

/// One `category: count` line per category.
pub fn render_summary(summary: &Summary) -> String {
    summary
        .iter()
        .map(|(category, count)| format!("{}: {}", category, count))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::domain;

    #[test]
    fn test_summarize_counts_in_first_seen_order() {
        let results = vec![
            ScanResult::new(domain("a.com"), Some(404), "custom_404"),
            ScanResult::new(domain("b.com"), Some(200), "no_error"),
            ScanResult::new(domain("c.com"), Some(404), "custom_404"),
            ScanResult::unreachable(domain("d.com")),
        ];

        let summary = summarize(&results);
        let entries: Vec<(&str, usize)> =
            summary.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        assert_eq!(
            entries,
            vec![("custom_404", 2), ("no_error", 1), ("unreachable", 1)]
        );
        assert_eq!(
            render_summary(&summary),
            "custom_404: 2\nno_error: 1\nunreachable: 1"
        );
    }

    #[test]
    fn test_empty_summary() {
        assert!(summarize(&[]).is_empty());
        assert_eq!(render_summary(&Summary::new()), "");
    }
}
