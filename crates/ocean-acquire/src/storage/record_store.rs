//! Purchase record log — append-only persistence of acquisitions.
//!
//! The log is a single JSON array, oldest first:
//! ```json
//! [
//!   {
//!     "dataset": "enron",
//!     "timestamp": 1718000000,
//!     "access_token": "9b1c...",
//!     "file_path": "purchases/enron_full_dataset.csv",
//!     "wallet_address": "0xf89f...",
//!     "status": "completed"
//!   }
//! ]
//! ```
//!
//! Every append reads the whole array and rewrites it. The rewrite is atomic
//! (temp file + rename) but the read-modify-write is not locked: two
//! processes appending at once can lose a record.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AcquireError, Result};
use crate::storage::write_atomic;

/// Terminal status of an acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Completed,
    Failed,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Completed => "completed",
            RecordStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the purchase record log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcquisitionRecord {
    /// Catalog key of the acquired asset.
    pub dataset: String,
    /// Completion time, seconds since Unix epoch.
    pub timestamp: u64,
    pub access_token: String,
    /// Where the asset was written.
    pub file_path: String,
    /// `0x`-prefixed holder reference.
    pub wallet_address: String,
    pub status: RecordStatus,
}

/// Filesystem-backed purchase record log.
///
/// Safe for a single writer only.
#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    /// Open the log at `path`. The file is created lazily on first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record.
    ///
    /// Loads the existing sequence (empty if the file does not exist), pushes
    /// `record`, and rewrites the whole file.
    ///
    /// # Errors
    ///
    /// Returns `AcquireError::InvalidFileFormat` if the existing log cannot be
    /// parsed (the file is left untouched), or `AcquireError::Io` for
    /// filesystem errors.
    pub fn append(&self, record: &AcquisitionRecord) -> Result<()> {
        let mut records = self.list_all()?;
        records.push(record.clone());

        let json = serde_json::to_string_pretty(&records)
            .map_err(|e| AcquireError::SerializationError(e.to_string()))?;
        write_atomic(&self.path, json.as_bytes())?;

        log::debug!(
            "appended record for {} to {} ({} total)",
            record.dataset,
            self.path.display(),
            records.len()
        );
        Ok(())
    }

    /// All records in insertion order. A missing log reads as empty.
    ///
    /// # Errors
    ///
    /// Returns `AcquireError::InvalidFileFormat` for a malformed log, or
    /// `AcquireError::Io` for other filesystem errors.
    pub fn list_all(&self) -> Result<Vec<AcquisitionRecord>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AcquireError::Io(e)),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&bytes).map_err(|e| {
            AcquireError::InvalidFileFormat(format!(
                "failed to parse purchase records {}: {e}",
                self.path.display()
            ))
        })
    }

    /// Number of records in the log.
    pub fn len(&self) -> Result<usize> {
        Ok(self.list_all()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
