mod progress;

pub use progress::{ConsoleWriterFactory, ScanProgressBar};
