//! Durable scan progress.
//!
//! The store holds one JSON array with every result of the current run. Each
//! save rewrites the whole array (O(n^2) bytes over a run, fine for the
//! hundreds-to-thousands of domains this tool targets). Writes land in a
//! sibling temp file that is then renamed over the record, so a crash mid-write
//! leaves the previous snapshot intact.

use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{Result, ScanError};
use crate::probe::ScanResult;

pub const DEFAULT_PROGRESS_FILE: &str = "hostscan_progress.json";

#[derive(Debug)]
pub struct ProgressStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl ProgressStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Replace the record with `results`.
    pub async fn save(&self, results: &[ScanResult]) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let progress_error = |reason: String| ScanError::Progress {
            path: self.path.clone(),
            reason,
        };

        let json = serde_json::to_vec(results).map_err(|e| progress_error(e.to_string()))?;

        let tmp_path = self.tmp_path();
        tokio::fs::write(&tmp_path, &json)
            .await
            .map_err(|e| progress_error(e.to_string()))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| progress_error(e.to_string()))?;

        debug!(path = %self.path.display(), count = results.len(), "Saved progress");
        Ok(())
    }

    /// Last saved results. Missing or corrupt records yield an empty list.
    pub async fn load(&self) -> Vec<ScanResult> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Could not read progress file");
                return Vec::new();
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(results) => results,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring corrupt progress file");
                Vec::new()
            }
        }
    }

    /// Delete the record. A record that is already gone is fine.
    pub async fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| DEFAULT_PROGRESS_FILE.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
