//! Durable storage: the purchase record log and atomic file writes.
//!
//! # Directory layout
//!
//! By convention everything lives under `./purchases/`:
//!
//! ```text
//! purchases/
//! ├── purchase_records.json          append-only acquisition log
//! ├── enron_full_dataset.csv         retrieved assets
//! └── cameroon_full_dataset.json
//! ```

pub mod record_store;

use std::path::Path;

use crate::error::Result;

pub use record_store::{AcquisitionRecord, RecordStatus, RecordStore};

/// Write `data` to `path` atomically using a sibling temporary file.
///
/// Creates the parent directory if it does not exist. The data is written to
/// `{path}.tmp`, synced, and renamed into place, so readers see either the
/// old content or the new content, never a partial write.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = std::path::PathBuf::from(tmp_name);

    {
        use std::io::Write;
        let mut file = std::fs::File::create(&tmp_path)?;
        file.write_all(data)?;
        file.sync_all()?;
    }

    std::fs::rename(&tmp_path, path)?;

    Ok(())
}
