//! Quick inspection of a retrieved dataset file.

use std::path::Path;

use serde::Serialize;

use crate::error::{AcquireError, Result};

/// Number of data lines shown for CSV files.
const CSV_SAMPLE_LINES: usize = 5;

/// Number of characters shown for JSON files.
const JSON_PREVIEW_CHARS: usize = 500;

/// Shape of a retrieved file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "format", rename_all = "lowercase")]
pub enum DatasetSummary {
    Csv {
        file_size: u64,
        total_lines: usize,
        header: String,
        sample_lines: Vec<String>,
    },
    Json {
        file_size: u64,
        /// `object`, `array`, `string`, `number`, `bool` or `null`.
        structure: String,
        /// Top-level keys when the document is an object.
        keys: Option<Vec<String>>,
        preview: String,
    },
    Unknown {
        file_size: u64,
    },
}

impl DatasetSummary {
    pub fn file_size(&self) -> u64 {
        match self {
            DatasetSummary::Csv { file_size, .. }
            | DatasetSummary::Json { file_size, .. }
            | DatasetSummary::Unknown { file_size } => *file_size,
        }
    }
}

/// Summarize the file at `path`, dispatching on its extension.
///
/// # Errors
///
/// Returns `AcquireError::Io` if the file cannot be read and
/// `AcquireError::InvalidFileFormat` for a `.json` file that does not parse.
pub fn summarize(path: &Path) -> Result<DatasetSummary> {
    let file_size = std::fs::metadata(path)?.len();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("csv") => {
            let text = std::fs::read_to_string(path)?;
            let lines: Vec<&str> = text.lines().collect();
            Ok(DatasetSummary::Csv {
                file_size,
                total_lines: lines.len(),
                header: lines.first().map(|l| l.trim().to_string()).unwrap_or_default(),
                sample_lines: lines
                    .iter()
                    .skip(1)
                    .take(CSV_SAMPLE_LINES)
                    .map(|l| l.to_string())
                    .collect(),
            })
        }
        Some("json") => {
            let bytes = std::fs::read(path)?;
            let value: serde_json::Value = serde_json::from_slice(&bytes).map_err(|e| {
                AcquireError::InvalidFileFormat(format!("{}: {e}", path.display()))
            })?;

            let structure = match &value {
                serde_json::Value::Object(_) => "object",
                serde_json::Value::Array(_) => "array",
                serde_json::Value::String(_) => "string",
                serde_json::Value::Number(_) => "number",
                serde_json::Value::Bool(_) => "bool",
                serde_json::Value::Null => "null",
            };
            let keys = value.as_object().map(|o| o.keys().cloned().collect());
            let preview: String = value.to_string().chars().take(JSON_PREVIEW_CHARS).collect();

            Ok(DatasetSummary::Json {
                file_size,
                structure: structure.to_string(),
                keys,
                preview,
            })
        }
        _ => Ok(DatasetSummary::Unknown { file_size }),
    }
}
