//! Scan progress bar with tracing integration.
//!
//! While a [`ScanProgressBar`] is alive, console log lines are printed through
//! it so they do not tear the bar.

use std::io::Write;
use std::sync::{Mutex, MutexGuard};

use indicatif::{ProgressBar, ProgressStyle};

/// The bar currently on screen, if any.
static ACTIVE_BAR: Mutex<Option<ProgressBar>> = Mutex::new(None);

fn active_bar() -> MutexGuard<'static, Option<ProgressBar>> {
    ACTIVE_BAR.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Print a line above the active bar, or to stderr when there is none.
fn emit_line(line: &str) -> std::io::Result<()> {
    if let Some(pb) = active_bar().as_ref() {
        pb.println(line);
        return Ok(());
    }
    let mut stderr = std::io::stderr();
    stderr.write_all(line.as_bytes())?;
    stderr.write_all(b"\n")
}

/// Progress bar over the domains left to scan.
#[derive(Clone)]
pub struct ScanProgressBar {
    bar: ProgressBar,
}

impl ScanProgressBar {
    pub fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("Scanning {bar:40.cyan/blue} {pos}/{len} domains [{elapsed_precise} < {eta_precise}]")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        *active_bar() = Some(bar.clone());
        Self { bar }
    }

    /// Record a completed domain and print its result line.
    pub fn record(&self, completed: usize, line: &str) {
        self.bar.println(line);
        self.bar.set_position(completed as u64);
    }

    pub fn finish(&self) {
        *active_bar() = None;
        self.bar.finish_and_clear();
    }
}

/// Buffers bytes and emits complete lines around the active bar.
#[derive(Default)]
pub struct ConsoleWriter {
    buffer: Vec<u8>,
}

impl Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);

        while let Some(newline_pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
            let line = String::from_utf8_lossy(&line);
            emit_line(line.trim_end_matches('\n'))?;
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let rest = String::from_utf8_lossy(&self.buffer).trim_end().to_string();
        self.buffer.clear();
        if rest.is_empty() {
            Ok(())
        } else {
            emit_line(&rest)
        }
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

/// `MakeWriter` handing out [`ConsoleWriter`]s to tracing-subscriber.
#[derive(Default)]
pub struct ConsoleWriterFactory;

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for ConsoleWriterFactory {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter::default()
    }
}
