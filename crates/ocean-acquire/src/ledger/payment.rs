//! Payment requests, receipts and balances.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::catalog::{AssetDescriptor, Price, PriceQuote};
use crate::error::Result;
use crate::identity::{Identity, UnlockedKey};

/// Lifecycle of a submitted payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Confirmed,
    Failed,
}

impl PaymentStatus {
    /// Whether the ledger will report no further status changes.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Confirmed => "confirmed",
            PaymentStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Holder balances as reported by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// Balance in the payment token.
    pub token: Price,
    /// Balance in the network fee token.
    pub gas: Price,
    /// Whether the holder can pay for acquisitions at all.
    pub sufficient: bool,
}

/// A payment the holder asks the ledger to execute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// `0x`-prefixed payer reference.
    pub holder: String,
    pub asset_key: String,
    pub asset_did: String,
    pub amount: Price,
    /// Submission time, seconds since Unix epoch.
    pub issued_at: u64,
    /// Hex authorization tag from the unlocked holder key, when available.
    pub authorization: Option<String>,
}

impl PaymentRequest {
    pub fn new(identity: &Identity, asset: &AssetDescriptor, quote: &PriceQuote, now: u64) -> Self {
        Self {
            holder: identity.holder_reference(),
            asset_key: asset.key.clone(),
            asset_did: asset.did.clone(),
            amount: quote.price.clone(),
            issued_at: now,
            authorization: None,
        }
    }

    /// SHA-256 over the fields the authorization tag binds.
    pub fn digest(&self) -> [u8; 32] {
        let input = format!(
            "{}:{}:{}:{}",
            self.holder, self.asset_did, self.amount, self.issued_at
        );
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&Sha256::digest(input.as_bytes()));
        digest
    }

    /// Attach an authorization tag derived from `key`.
    pub fn authorize(mut self, key: &UnlockedKey) -> Result<Self> {
        self.authorization = Some(key.authorize(&self.digest())?);
        Ok(self)
    }

    /// Transaction hash for this request: `0x` + SHA-256 of the bare holder
    /// address, the asset DID and the submission second.
    pub fn transaction_hash(&self) -> String {
        let address = self.holder.trim_start_matches("0x");
        let input = format!("{address}{}{}", self.asset_did, self.issued_at);
        format!("0x{}", hex::encode(Sha256::digest(input.as_bytes())))
    }
}

/// Proof of a submitted payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub tx_hash: String,
    pub status: PaymentStatus,
    pub block_number: u64,
    pub gas_used: u64,
    /// Seconds since Unix epoch.
    pub timestamp: u64,
}

impl PaymentReceipt {
    /// Abbreviated hash for log lines.
    pub fn short_hash(&self) -> &str {
        match self.tx_hash.char_indices().nth(10) {
            Some((end, _)) => &self.tx_hash[..end],
            None => &self.tx_hash,
        }
    }
}
