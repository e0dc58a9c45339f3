//! Cryptographic primitives for the wallet keystore.
//!
//! - Argon2id passphrase-based key derivation
//! - ChaCha20-Poly1305 authenticated encryption of the holder secret
//! - HKDF-SHA256 derivation of scoped keys (keystore encryption, payment
//!   authorization tags)
//! - Secure random generation

pub mod derivation;
pub mod encryption;
pub mod random;
