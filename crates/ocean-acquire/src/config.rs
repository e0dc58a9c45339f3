//! Acquirer configuration.
//!
//! Loaded from an optional JSON file, then overridden from the environment.
//! Every field has a default, so an empty file (or no file) is a complete
//! configuration.
//!
//! | variable               | field           |
//! |------------------------|-----------------|
//! | `AQUARIUS_URL`         | `aquarius_url`  |
//! | `PROVIDER_URL`         | `provider_url`  |
//! | `NETWORK_URL`          | `network_url`   |
//! | `WALLET_KEYSTORE_PATH` | `keystore_path` |
//! | `ACQUIRE_OUTPUT_DIR`   | `output_dir`    |
//! | `ACQUIRE_RECORDS_PATH` | `records_path`  |

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::access::{DeterministicIssuer, DEFAULT_CREDENTIAL_LIFETIME_SECS};
use crate::catalog::{
    default_assets, AssetDescriptor, Price, StaticCatalog, TokenAmount, DEFAULT_QUOTE_VALIDITY_SECS,
};
use crate::error::{AcquireError, Result};
use crate::ledger::SimulatedLedger;
use crate::retrieval::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::storage::RecordStore;

/// Configuration for one acquirer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquirerConfig {
    /// Marketplace metadata service.
    pub aquarius_url: String,
    /// Marketplace access provider.
    pub provider_url: String,
    /// Ledger RPC endpoint. Informational; payments are simulated.
    pub network_url: Option<String>,
    /// Directory retrieved assets are written to.
    pub output_dir: PathBuf,
    /// Purchase record log.
    pub records_path: PathBuf,
    /// Wallet keystore.
    pub keystore_path: Option<PathBuf>,
    pub request_timeout_secs: u64,
    pub quote_validity_secs: u64,
    pub credential_lifetime_secs: u64,
    /// Refuse to pay against an expired quote.
    pub enforce_quote_expiry: bool,
    /// Status polls allowed while a payment is pending.
    pub confirmation_max_polls: u32,
    pub confirmation_poll_interval_ms: u64,
    pub simulated_balance: Price,
    pub simulated_gas_balance: Price,
    pub gas_estimate: Price,
    /// Catalog table, in listing order.
    pub assets: Vec<AssetDescriptor>,
}

impl Default for AcquirerConfig {
    fn default() -> Self {
        Self {
            aquarius_url: "https://v4.aquarius.oceanprotocol.com".to_string(),
            provider_url: "https://v4.provider.oceanprotocol.com".to_string(),
            network_url: None,
            output_dir: PathBuf::from("./purchases"),
            records_path: PathBuf::from("purchases/purchase_records.json"),
            keystore_path: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            quote_validity_secs: DEFAULT_QUOTE_VALIDITY_SECS,
            credential_lifetime_secs: DEFAULT_CREDENTIAL_LIFETIME_SECS,
            enforce_quote_expiry: true,
            confirmation_max_polls: 10,
            confirmation_poll_interval_ms: 500,
            simulated_balance: Price::new(
                TokenAmount::from_base_units(10_500_000_000_000_000_000),
                "OCEAN",
            ),
            simulated_gas_balance: Price::new(
                TokenAmount::from_base_units(250_000_000_000_000_000),
                "ETH",
            ),
            gas_estimate: Price::new(TokenAmount::from_base_units(2_000_000_000_000_000), "ETH"),
            assets: default_assets(),
        }
    }
}

impl AcquirerConfig {
    /// Read a JSON configuration file. Absent fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `AcquireError::Io` if the file cannot be read and
    /// `AcquireError::Config` if it does not parse.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        serde_json::from_slice(&bytes)
            .map_err(|e| AcquireError::Config(format!("{}: {e}", path.display())))
    }

    /// Override fields from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Override fields from `lookup`. Empty values are ignored.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("AQUARIUS_URL") {
            self.aquarius_url = v;
        }
        if let Some(v) = get("PROVIDER_URL") {
            self.provider_url = v;
        }
        if let Some(v) = get("NETWORK_URL") {
            self.network_url = Some(v);
        }
        if let Some(v) = get("WALLET_KEYSTORE_PATH") {
            self.keystore_path = Some(PathBuf::from(v));
        }
        if let Some(v) = get("ACQUIRE_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(v);
        }
        if let Some(v) = get("ACQUIRE_RECORDS_PATH") {
            self.records_path = PathBuf::from(v);
        }
    }

    /// Check invariants the acquirer relies on.
    pub fn validate(&self) -> Result<()> {
        if self.aquarius_url.trim().is_empty() || self.provider_url.trim().is_empty() {
            return Err(AcquireError::Config("service URLs cannot be empty".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(AcquireError::Config("request_timeout_secs must be > 0".to_string()));
        }
        if self.confirmation_max_polls == 0 {
            return Err(AcquireError::Config("confirmation_max_polls must be > 0".to_string()));
        }
        if self.assets.is_empty() {
            return Err(AcquireError::Config("asset table is empty".to_string()));
        }
        for (i, asset) in self.assets.iter().enumerate() {
            if asset.key.trim().is_empty() || asset.format.trim().is_empty() {
                return Err(AcquireError::Config(format!(
                    "asset #{i} needs a key and a format"
                )));
            }
            if self.assets[..i].iter().any(|a| a.key == asset.key) {
                return Err(AcquireError::Config(format!("duplicate asset key '{}'", asset.key)));
            }
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn confirmation_poll_interval(&self) -> Duration {
        Duration::from_millis(self.confirmation_poll_interval_ms)
    }

    pub fn catalog(&self) -> StaticCatalog {
        StaticCatalog::new(self.assets.clone())
            .with_quote_validity(self.quote_validity_secs)
            .with_gas_estimate(self.gas_estimate.clone())
    }

    pub fn simulated_ledger(&self) -> SimulatedLedger {
        SimulatedLedger::new(self.simulated_balance.clone(), self.simulated_gas_balance.clone())
    }

    pub fn issuer(&self) -> DeterministicIssuer {
        DeterministicIssuer::new(self.credential_lifetime_secs)
    }

    pub fn record_store(&self) -> RecordStore {
        RecordStore::new(&self.records_path)
    }
}
