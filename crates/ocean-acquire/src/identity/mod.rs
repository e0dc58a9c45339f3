//! Holder identity — the wallet the acquisition is performed for.
//!
//! An [`Identity`] is the public part of a wallet keystore: the holder
//! address, the keystore id and its format version. An [`UnlockedKey`] is
//! the holder secret recovered from a sealed keystore with its passphrase;
//! it is only needed to authorize payments.

pub mod keystore;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::derivation::{derive_salted_key, PAYMENT_AUTHORIZATION_CONTEXT};
use crate::error::Result;

pub use keystore::{create_keystore, load_identity, seal_keystore, unlock_keystore, KeystoreFile};

/// Placeholder used by keystores that omit a field.
pub const UNKNOWN_FIELD: &str = "Unknown";

/// Public identity of the holder performing acquisitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    holder: String,
    id: String,
    version: String,
}

impl Identity {
    pub fn new(
        holder: impl Into<String>,
        id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            holder: holder.into(),
            id: id.into(),
            version: version.into(),
        }
    }

    /// Holder address without any `0x` prefix.
    pub fn address(&self) -> &str {
        let trimmed = self.holder.trim();
        trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed)
    }

    /// Holder reference in `0x`-prefixed form, as written to purchase records.
    pub fn holder_reference(&self) -> String {
        format!("0x{}", self.address())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// An identity is usable when it carries a real holder address.
    pub fn is_well_formed(&self) -> bool {
        let address = self.address();
        !address.is_empty() && address != UNKNOWN_FIELD
    }
}

/// Holder secret recovered from a sealed keystore.
///
/// Zeroized on drop; never printed.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct UnlockedKey {
    secret: [u8; 32],
}

impl UnlockedKey {
    pub(crate) fn from_bytes(secret: [u8; 32]) -> Self {
        Self { secret }
    }

    /// Derive the hex authorization tag for a payment request digest.
    ///
    /// The tag is HKDF-SHA256 keyed by the holder secret and salted with the
    /// digest, so it binds the holder to exactly that request.
    pub fn authorize(&self, digest: &[u8]) -> Result<String> {
        let mut tag = derive_salted_key(&self.secret, Some(digest), PAYMENT_AUTHORIZATION_CONTEXT)?;
        let encoded = hex::encode(tag);
        tag.zeroize();
        Ok(encoded)
    }
}

impl std::fmt::Debug for UnlockedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("UnlockedKey(<redacted>)")
    }
}
