//! Catalog — asset resolution and pricing.
//!
//! The orchestrator talks to the catalog through [`CatalogClient`].
//! [`StaticCatalog`] serves a configured table of assets and issues quotes
//! from their listed prices. [`AquariusClient`] looks up published metadata
//! for an asset on a marketplace metadata service.

pub mod amount;
pub mod aquarius;
pub mod asset;
pub mod quote;

pub use amount::{Price, TokenAmount};
pub use aquarius::{AquariusClient, AssetMetadata};
pub use asset::{default_assets, AssetDescriptor};
pub use quote::{AccessType, PriceQuote};

use crate::error::{AcquireError, Result};

/// Default quote lifetime: 24 hours.
pub const DEFAULT_QUOTE_VALIDITY_SECS: u64 = 86_400;

/// Resolves assets and prices them.
pub trait CatalogClient {
    /// Look up an asset by catalog key.
    ///
    /// Returns `AcquireError::UnknownAsset` if the key is not listed.
    fn resolve(&self, asset_key: &str) -> Result<AssetDescriptor>;

    /// Produce a fresh quote for `asset` as of `now`.
    fn quote(&self, asset: &AssetDescriptor, now: u64) -> Result<PriceQuote>;

    /// All listed assets, in listing order.
    fn assets(&self) -> Vec<AssetDescriptor>;
}

/// A catalog backed by a fixed asset table.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    assets: Vec<AssetDescriptor>,
    quote_validity_secs: u64,
    gas_estimate: Price,
}

impl StaticCatalog {
    pub fn new(assets: Vec<AssetDescriptor>) -> Self {
        Self {
            assets,
            quote_validity_secs: DEFAULT_QUOTE_VALIDITY_SECS,
            gas_estimate: Price::new(TokenAmount::from_base_units(2_000_000_000_000_000), "ETH"),
        }
    }

    pub fn with_quote_validity(mut self, secs: u64) -> Self {
        self.quote_validity_secs = secs;
        self
    }

    pub fn with_gas_estimate(mut self, gas_estimate: Price) -> Self {
        self.gas_estimate = gas_estimate;
        self
    }
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self::new(default_assets())
    }
}

impl CatalogClient for StaticCatalog {
    fn resolve(&self, asset_key: &str) -> Result<AssetDescriptor> {
        self.assets
            .iter()
            .find(|a| a.key == asset_key)
            .cloned()
            .ok_or_else(|| AcquireError::UnknownAsset(asset_key.to_string()))
    }

    fn quote(&self, asset: &AssetDescriptor, now: u64) -> Result<PriceQuote> {
        // Only assets from this table can be priced.
        let listed = self.resolve(&asset.key)?;
        log::info!("Querying price information: {}", listed.name);

        Ok(PriceQuote {
            asset_key: listed.key,
            price: listed.price,
            access_type: AccessType::OneTime,
            issued_at: now,
            valid_until: now.saturating_add(self.quote_validity_secs),
            gas_estimate: self.gas_estimate.clone(),
        })
    }

    fn assets(&self) -> Vec<AssetDescriptor> {
        self.assets.clone()
    }
}
