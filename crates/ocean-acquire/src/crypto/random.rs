//! Secure random generation for keystore material.
//!
//! Uses the operating system's cryptographic random source via `rand`.

use rand::RngCore;

/// Generate a fixed-size array of cryptographically secure random bytes.
pub fn random_bytes<const N: usize>() -> [u8; N] {
    let mut buf = [0u8; N];
    rand::thread_rng().fill_bytes(&mut buf);
    buf
}

/// Generate a fresh 32-byte holder secret for a new keystore.
pub fn random_secret_32() -> [u8; 32] {
    random_bytes()
}

/// Generate a random 12-byte nonce (for ChaCha20-Poly1305).
pub fn random_nonce_12() -> [u8; 12] {
    random_bytes()
}

/// Generate a random 16-byte Argon2id salt.
pub fn random_salt_16() -> [u8; 16] {
    random_bytes()
}
