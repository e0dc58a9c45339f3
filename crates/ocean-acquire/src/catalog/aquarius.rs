//! Marketplace metadata lookup against an Aquarius metadata service.
//!
//! `GET {base_url}/api/aquarius/assets/ddo/{did}` returns the asset's DDO
//! (decentralized data object). Only a summary of its metadata is kept.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AcquireError, Result};

/// Summary of a published asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetMetadata {
    pub did: String,
    pub name: String,
    pub description: String,
    pub author: String,
    pub created: String,
    pub asset_type: String,
    pub services: usize,
    pub files: usize,
}

impl AssetMetadata {
    /// Extract the summary from a DDO document, defaulting absent fields.
    pub fn from_ddo(did: &str, ddo: &serde_json::Value) -> Self {
        let metadata = &ddo["metadata"];
        let text = |field: &str, default: &str| {
            metadata[field]
                .as_str()
                .unwrap_or(default)
                .to_string()
        };

        Self {
            did: did.to_string(),
            name: text("name", "Unknown"),
            description: text("description", ""),
            author: text("author", "Unknown"),
            created: text("created", ""),
            asset_type: text("type", "dataset"),
            services: ddo["services"].as_array().map_or(0, Vec::len),
            files: metadata["files"].as_array().map_or(0, Vec::len),
        }
    }
}

/// Blocking HTTP client for the metadata service.
#[derive(Debug)]
pub struct AquariusClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl AquariusClient {
    /// Create a client with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AcquireError::Config(format!("failed to build HTTP client: {e}")))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    /// URL of the DDO for `did`.
    pub fn ddo_url(&self, did: &str) -> String {
        format!("{}/api/aquarius/assets/ddo/{did}", self.base_url)
    }

    /// Fetch the metadata summary for `did`.
    ///
    /// # Errors
    ///
    /// Returns `AcquireError::UnknownAsset` on HTTP 404 and
    /// `AcquireError::Quote` for transport failures, other non-2xx statuses,
    /// or a body that is not JSON.
    pub fn fetch_metadata(&self, did: &str) -> Result<AssetMetadata> {
        let url = self.ddo_url(did);
        log::info!("Querying metadata: {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| AcquireError::Quote(format!("metadata request {url}: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(AcquireError::UnknownAsset(did.to_string()));
        }
        if !status.is_success() {
            return Err(AcquireError::Quote(format!(
                "metadata request {url} returned HTTP {status}"
            )));
        }

        let ddo: serde_json::Value = response
            .json()
            .map_err(|e| AcquireError::Quote(format!("malformed DDO from {url}: {e}")))?;

        let metadata = AssetMetadata::from_ddo(did, &ddo);
        log::info!("Metadata lookup succeeded: {}", metadata.name);
        Ok(metadata)
    }
}
