use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::display::ConsoleWriterFactory;

/// Log to `log_file`, and to the console as well when `console` is set.
///
/// `RUST_LOG` overrides `level`.
pub fn init(level: &str, log_file: &Path, console: bool) -> anyhow::Result<()> {
    let file = File::create(log_file)
        .with_context(|| format!("creating log file {}", log_file.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false);

    let console_layer = console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(ConsoleWriterFactory)
            .with_target(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("installing tracing subscriber")?;

    Ok(())
}
