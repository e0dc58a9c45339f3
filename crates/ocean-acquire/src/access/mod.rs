//! Access credentials — exchanging a payment receipt for a download token.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{AcquireError, Result};
use crate::identity::Identity;
use crate::ledger::{PaymentReceipt, PaymentStatus};

/// Default credential lifetime: one hour.
pub const DEFAULT_CREDENTIAL_LIFETIME_SECS: u64 = 3_600;

/// Number of hex characters in a derived token.
const TOKEN_HEX_LEN: usize = 32;

/// A short-lived token authorizing retrieval of one asset.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessCredential {
    pub token: String,
    pub asset_key: String,
    /// Seconds since Unix epoch.
    pub issued_at: u64,
    pub expires_at: u64,
}

impl AccessCredential {
    pub fn is_expired_at(&self, now: u64) -> bool {
        now > self.expires_at
    }

    /// First 16 characters of the token, for log lines.
    pub fn redacted(&self) -> String {
        let prefix: String = self.token.chars().take(16).collect();
        format!("{prefix}...")
    }
}

impl std::fmt::Debug for AccessCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessCredential")
            .field("token", &self.redacted())
            .field("asset_key", &self.asset_key)
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Exchanges payment receipts for access credentials.
pub trait CredentialIssuer {
    /// Issue a credential for `asset_key` against `receipt`.
    ///
    /// Returns `AcquireError::Issuance` if the receipt is not acceptable.
    fn issue(
        &self,
        receipt: &PaymentReceipt,
        asset_key: &str,
        identity: &Identity,
        now: u64,
    ) -> Result<AccessCredential>;
}

/// Issues tokens derived from the receipt, asset and holder.
///
/// The token is the first 32 hex characters of
/// SHA-256(tx_hash + asset_key + holder address), so the same purchase always
/// yields the same token.
#[derive(Debug, Clone)]
pub struct DeterministicIssuer {
    lifetime_secs: u64,
}

impl DeterministicIssuer {
    pub fn new(lifetime_secs: u64) -> Self {
        Self { lifetime_secs }
    }

    /// Derive the token for a purchase.
    pub fn derive_token(tx_hash: &str, asset_key: &str, identity: &Identity) -> String {
        let input = format!("{tx_hash}{asset_key}{}", identity.address());
        let mut token = hex::encode(Sha256::digest(input.as_bytes()));
        token.truncate(TOKEN_HEX_LEN);
        token
    }
}

impl Default for DeterministicIssuer {
    fn default() -> Self {
        Self::new(DEFAULT_CREDENTIAL_LIFETIME_SECS)
    }
}

impl CredentialIssuer for DeterministicIssuer {
    fn issue(
        &self,
        receipt: &PaymentReceipt,
        asset_key: &str,
        identity: &Identity,
        now: u64,
    ) -> Result<AccessCredential> {
        if receipt.status != PaymentStatus::Confirmed {
            return Err(AcquireError::Issuance(format!(
                "transaction {} is {}, not confirmed",
                receipt.short_hash(),
                receipt.status
            )));
        }

        log::info!("Generating dataset access token...");
        let credential = AccessCredential {
            token: Self::derive_token(&receipt.tx_hash, asset_key, identity),
            asset_key: asset_key.to_string(),
            issued_at: now,
            expires_at: now.saturating_add(self.lifetime_secs),
        };
        log::info!("Access token issued: {}", credential.redacted());
        Ok(credential)
    }
}
