//! Retrieval — exchanging an access credential for asset content.
//!
//! [`LocatorRetrievalClient`] dispatches on the asset locator's scheme:
//! `http://` and `https://` are fetched with a blocking HTTP client,
//! `file://` reads a local mirror.

pub mod summary;

use std::path::Path;
use std::time::Duration;

use crate::access::AccessCredential;
use crate::catalog::AssetDescriptor;
use crate::error::{AcquireError, Result};

pub use summary::{summarize, DatasetSummary};

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Fetches asset bytes.
pub trait RetrievalClient {
    /// Retrieve the content of `asset` using `credential`.
    ///
    /// Fails with `NotAuthorized`, `NotFound`, or `Retrieval`.
    fn fetch(&self, asset: &AssetDescriptor, credential: &AccessCredential) -> Result<Vec<u8>>;
}

/// Retrieval by locator scheme.
#[derive(Debug)]
pub struct LocatorRetrievalClient {
    client: reqwest::blocking::Client,
}

impl LocatorRetrievalClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AcquireError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    fn fetch_http(
        &self,
        asset: &AssetDescriptor,
        credential: &AccessCredential,
    ) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(&asset.locator)
            .bearer_auth(&credential.token)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    AcquireError::Retrieval(format!("{} timed out", asset.locator))
                } else {
                    AcquireError::Retrieval(format!("{}: {e}", asset.locator))
                }
            })?;

        check_status(response.status().as_u16(), asset)?;

        let bytes = response.bytes().map_err(|e| {
            AcquireError::Retrieval(format!("reading body of {}: {e}", asset.locator))
        })?;
        Ok(bytes.to_vec())
    }

    fn fetch_file(path: &Path, asset: &AssetDescriptor) -> Result<Vec<u8>> {
        match std::fs::read(path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AcquireError::NotFound(format!("{} ({})", asset.key, path.display())))
            }
            Err(e) => Err(AcquireError::Retrieval(format!("{}: {e}", path.display()))),
        }
    }
}

impl RetrievalClient for LocatorRetrievalClient {
    fn fetch(&self, asset: &AssetDescriptor, credential: &AccessCredential) -> Result<Vec<u8>> {
        if credential.asset_key != asset.key {
            return Err(AcquireError::NotAuthorized(format!(
                "{} (credential issued for {})",
                asset.key, credential.asset_key
            )));
        }

        if let Some(path) = asset.locator.strip_prefix("file://") {
            return Self::fetch_file(Path::new(path), asset);
        }
        if asset.locator.starts_with("http://") || asset.locator.starts_with("https://") {
            return self.fetch_http(asset, credential);
        }

        Err(AcquireError::Retrieval(format!(
            "unsupported locator scheme: {}",
            asset.locator
        )))
    }
}

/// Map an HTTP status onto the retrieval error taxonomy.
fn check_status(status: u16, asset: &AssetDescriptor) -> Result<()> {
    match status {
        200..=299 => Ok(()),
        401 | 403 => Err(AcquireError::NotAuthorized(asset.key.clone())),
        404 => Err(AcquireError::NotFound(asset.key.clone())),
        other => Err(AcquireError::Retrieval(format!(
            "{} returned HTTP {other}",
            asset.locator
        ))),
    }
}
