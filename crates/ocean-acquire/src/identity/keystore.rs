//! Wallet keystore files.
//!
//! A keystore is a JSON document whose public fields can be read without any
//! secret. It may additionally carry a `crypto` section holding the 32-byte
//! holder secret encrypted with ChaCha20-Poly1305 under a key derived from a
//! passphrase (Argon2id, then HKDF-SHA256).
//!
//! File format (JSON):
//! ```json
//! {
//!     "address": "f89f413d855d86ec8ac7a26bbfb7aa49df290004",
//!     "id": "3198bc9c-6672-5ab3-d995-4942343ae5b6",
//!     "version": 3,
//!     "crypto": {
//!         "cipher": "chacha20-poly1305",
//!         "kdf": "argon2id",
//!         "salt": "<base64-16-bytes>",
//!         "nonce": "<base64-12-bytes>",
//!         "ciphertext": "<base64>"
//!     }
//! }
//! ```
//!
//! Keystores written by other wallets may carry a `crypto` section in a
//! different scheme. Their public fields still load; unlocking them fails
//! with `InvalidFileFormat`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use crate::crypto::derivation::{derive_key, KEYSTORE_ENCRYPTION_CONTEXT};
use crate::crypto::{encryption, random};
use crate::error::{AcquireError, Result};
use crate::identity::{Identity, UnlockedKey, UNKNOWN_FIELD};
use crate::storage::write_atomic;

// ── File format constants ─────────────────────────────────────────────────────

const KEYSTORE_VERSION: u32 = 3;
const KEYSTORE_CIPHER: &str = "chacha20-poly1305";
const KEYSTORE_KDF: &str = "argon2id";

// ── On-disk structures ────────────────────────────────────────────────────────

/// Keystore document as stored on disk.
///
/// Every field is optional on read so partially populated keystores still
/// yield an identity; validation happens when the identity is used.
#[derive(Debug, Serialize, Deserialize)]
pub struct KeystoreFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Numeric or string version marker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<serde_json::Value>,
    /// Sealed holder secret, kept untyped until unlock so foreign schemes
    /// do not break public-field loading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crypto: Option<serde_json::Value>,
}

/// The sealed holder secret.
#[derive(Debug, Serialize, Deserialize)]
struct SealedSecret {
    cipher: String,
    kdf: String,
    salt: String,
    nonce: String,
    ciphertext: String,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Read the public identity from a keystore file. No passphrase required.
///
/// # Errors
///
/// Returns `AcquireError::Io` if the file cannot be read and
/// `AcquireError::InvalidFileFormat` if it is not a JSON keystore.
pub fn load_identity(path: &Path) -> Result<Identity> {
    let file = read_keystore(path)?;

    let version = match file.version {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Null) | None => UNKNOWN_FIELD.to_string(),
        Some(other) => other.to_string(),
    };

    Ok(Identity::new(
        file.address.unwrap_or_default(),
        file.id.unwrap_or_else(|| UNKNOWN_FIELD.to_string()),
        version,
    ))
}

/// Create a new sealed keystore with a freshly generated holder secret.
///
/// The address is the last 20 bytes of SHA-256 over the secret, hex-encoded.
/// It is address-shaped but not an on-chain account derivation.
pub fn create_keystore(path: &Path, passphrase: &str) -> Result<Identity> {
    let mut secret = random::random_secret_32();
    let digest = Sha256::digest(secret);
    let address = hex::encode(&digest[12..]);
    let result = seal_keystore(&address, &secret, passphrase, path);
    secret.zeroize();
    result
}

/// Write a sealed keystore for `address` holding `secret`.
///
/// # Errors
///
/// Returns `AcquireError::DerivationFailed` / `EncryptionFailed` on crypto
/// failures, or `AcquireError::Io` for filesystem errors.
pub fn seal_keystore(
    address: &str,
    secret: &[u8; 32],
    passphrase: &str,
    path: &Path,
) -> Result<Identity> {
    if passphrase.is_empty() {
        return Err(AcquireError::Credential(
            "keystore passphrase cannot be empty".to_string(),
        ));
    }

    // passphrase → Argon2id(passphrase, salt) → master_key
    // HKDF-SHA256(master_key, KEYSTORE_ENCRYPTION_CONTEXT) → encryption_key
    let salt = random::random_salt_16();
    let mut master_key = encryption::derive_passphrase_key(passphrase.as_bytes(), &salt)?;
    let mut encryption_key = derive_key(&master_key, KEYSTORE_ENCRYPTION_CONTEXT)?;
    master_key.zeroize();

    let sealed = encryption::seal(&encryption_key, secret);
    encryption_key.zeroize();
    let (nonce, ciphertext) = sealed?;

    let sealed = SealedSecret {
        cipher: KEYSTORE_CIPHER.to_string(),
        kdf: KEYSTORE_KDF.to_string(),
        salt: b64_encode(&salt),
        nonce: b64_encode(&nonce),
        ciphertext: b64_encode(&ciphertext),
    };

    let id = uuid::Uuid::new_v4().to_string();
    let file = KeystoreFile {
        address: Some(address.trim_start_matches("0x").to_string()),
        id: Some(id.clone()),
        version: Some(serde_json::Value::from(KEYSTORE_VERSION)),
        crypto: Some(
            serde_json::to_value(&sealed)
                .map_err(|e| AcquireError::SerializationError(e.to_string()))?,
        ),
    };

    let json = serde_json::to_string_pretty(&file)
        .map_err(|e| AcquireError::SerializationError(e.to_string()))?;
    write_atomic(path, json.as_bytes())?;

    Ok(Identity::new(address, id, KEYSTORE_VERSION.to_string()))
}

/// Recover the holder secret from a sealed keystore.
///
/// # Errors
///
/// Returns `AcquireError::InvalidPassphrase` if the passphrase is wrong,
/// `AcquireError::Credential` if the keystore is not sealed, and
/// `AcquireError::InvalidFileFormat` for malformed or foreign crypto sections.
pub fn unlock_keystore(path: &Path, passphrase: &str) -> Result<UnlockedKey> {
    let file = read_keystore(path)?;
    let crypto = file.crypto.ok_or_else(|| {
        AcquireError::Credential(format!("keystore {} is not sealed", path.display()))
    })?;

    let sealed: SealedSecret = serde_json::from_value(crypto).map_err(|e| {
        AcquireError::InvalidFileFormat(format!("unsupported keystore crypto section: {e}"))
    })?;

    if sealed.cipher != KEYSTORE_CIPHER || sealed.kdf != KEYSTORE_KDF {
        return Err(AcquireError::InvalidFileFormat(format!(
            "unsupported keystore scheme cipher={} kdf={}",
            sealed.cipher, sealed.kdf
        )));
    }

    let salt: [u8; 16] = b64_decode(&sealed.salt, "salt")?
        .try_into()
        .map_err(|_| AcquireError::InvalidFileFormat("salt must be 16 bytes".to_string()))?;
    let nonce = b64_decode(&sealed.nonce, "nonce")?;
    let ciphertext = b64_decode(&sealed.ciphertext, "ciphertext")?;

    let mut master_key = encryption::derive_passphrase_key(passphrase.as_bytes(), &salt)?;
    let mut encryption_key = derive_key(&master_key, KEYSTORE_ENCRYPTION_CONTEXT)?;
    master_key.zeroize();

    let opened = encryption::open(&encryption_key, &nonce, &ciphertext);
    encryption_key.zeroize();
    let mut plaintext = opened?;

    let secret: std::result::Result<[u8; 32], _> = plaintext.as_slice().try_into();
    plaintext.zeroize();
    let secret = secret.map_err(|_| {
        AcquireError::InvalidFileFormat("holder secret must be 32 bytes".to_string())
    })?;

    Ok(UnlockedKey::from_bytes(secret))
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn read_keystore(path: &Path) -> Result<KeystoreFile> {
    let bytes = std::fs::read(path)?;
    serde_json::from_slice(&bytes).map_err(|e| {
        AcquireError::InvalidFileFormat(format!(
            "failed to parse keystore {}: {e}",
            path.display()
        ))
    })
}

fn b64_encode(bytes: &[u8]) -> String {
    base64::Engine::encode(&base64::engine::general_purpose::STANDARD, bytes)
}

fn b64_decode(value: &str, field: &str) -> Result<Vec<u8>> {
    base64::Engine::decode(&base64::engine::general_purpose::STANDARD, value)
        .map_err(|e| AcquireError::InvalidFileFormat(format!("invalid {field} base64: {e}")))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
