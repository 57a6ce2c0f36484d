//! Terminal palette for scan output.
//!
//! Uses standard ANSI bright colors for maximum terminal compatibility.

use colored::{ColoredString, Colorize};

use crate::classify::{DRY_RUN, NO_ERROR, UNREACHABLE};
use crate::probe::ScanResult;

/// Extension trait applying the scan palette to strings.
pub trait PaletteExt {
    fn healthy(&self) -> ColoredString;
    fn client_error(&self) -> ColoredString;
    fn server_error(&self) -> ColoredString;
    fn unreachable(&self) -> ColoredString;
    fn info(&self) -> ColoredString;
    fn notice(&self) -> ColoredString;
}

impl<S: AsRef<str>> PaletteExt for S {
    fn healthy(&self) -> ColoredString {
        self.as_ref().bright_green()
    }

    fn client_error(&self) -> ColoredString {
        self.as_ref().bright_yellow()
    }

    fn server_error(&self) -> ColoredString {
        self.as_ref().bright_red()
    }

    fn unreachable(&self) -> ColoredString {
        self.as_ref().bright_magenta()
    }

    fn info(&self) -> ColoredString {
        self.as_ref().bright_cyan()
    }

    fn notice(&self) -> ColoredString {
        self.as_ref().yellow()
    }
}

/// Color `text` the way the summary shows `category`.
pub fn paint_category(category: &str, text: &str) -> ColoredString {
    match category {
        NO_ERROR => text.healthy(),
        DRY_RUN | "custom" => text.info(),
        "custom_404" => text.client_error(),
        "custom_500" => text.server_error(),
        UNREACHABLE | "custom_403" | "custom_502" | "custom_503" => text.unreachable(),
        c if c.ends_with("_error") => text.client_error(),
        _ => text.normal(),
    }
}

/// `domain: status [category]`, colored by status class.
pub fn result_line(result: &ScanResult) -> ColoredString {
    match result.status_code {
        Some(status) => {
            let line = format!("{}: {} [{}]", result.domain, status, result.category);
            if status >= 500 {
                line.server_error()
            } else if status >= 400 {
                line.client_error()
            } else {
                line.healthy()
            }
        }
        None if result.category == DRY_RUN => format!("[DRY RUN] {}", result.domain).info(),
        None => format!("{}: {}", result.domain, result.category).unreachable(),
    }
}
