//! HKDF-SHA256 derivations scoped by context string.

use hkdf::Hkdf;
use sha2::Sha256;

use crate::error::{AcquireError, Result};

/// Context for the keystore encryption key derived from the Argon2id master
/// key. Must remain stable across versions.
pub const KEYSTORE_ENCRYPTION_CONTEXT: &str = "ocean-acquire/keystore-encryption";

/// Context prefix for payment authorization tags.
pub const PAYMENT_AUTHORIZATION_CONTEXT: &str = "ocean-acquire/payment-authorization";

/// Derive a 32-byte key from `ikm` and a context string (RFC 5869, no salt).
pub fn derive_key(ikm: &[u8; 32], context: &str) -> Result<[u8; 32]> {
    derive_salted_key(ikm, None, context)
}

/// Derive a 32-byte key from `ikm`, an optional salt and a context string.
pub fn derive_salted_key(ikm: &[u8; 32], salt: Option<&[u8]>, context: &str) -> Result<[u8; 32]> {
    let hk = Hkdf::<Sha256>::new(salt, ikm);
    let mut output = [0u8; 32];
    hk.expand(context.as_bytes(), &mut output)
        .map_err(|e| AcquireError::DerivationFailed(format!("HKDF expand failed: {e}")))?;
    Ok(output)
}
