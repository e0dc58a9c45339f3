//! Price quotes — a fresh, time-limited offer for one asset.

use serde::{Deserialize, Serialize};

use super::amount::Price;

/// Access granted by a purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessType {
    OneTime,
}

/// A price quote for one acquisition attempt. Never reused across attempts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub asset_key: String,
    pub price: Price,
    pub access_type: AccessType,
    /// When the quote was produced, seconds since Unix epoch.
    pub issued_at: u64,
    /// Last second at which the quote is usable.
    pub valid_until: u64,
    /// Estimated network fee for the payment transaction.
    pub gas_estimate: Price,
}

impl PriceQuote {
    pub fn is_expired_at(&self, now: u64) -> bool {
        now > self.valid_until
    }
}
