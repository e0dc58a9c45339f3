//! Error types for ocean-acquire.
//!
//! All errors are strongly typed and propagated without panicking.
//! Passphrases and unlocked key material are never included in error messages.

/// Coarse failure category of an [`AcquireError`].
///
/// Callers of the acquisition workflow match on this instead of parsing
/// error text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Credential,
    InsufficientFunds,
    UnknownAsset,
    Quote,
    Payment,
    Issuance,
    Retrieval,
    Storage,
    Config,
}

impl ErrorKind {
    /// Short operator-facing description, as printed on workflow failure.
    pub fn describe(&self) -> &'static str {
        match self {
            ErrorKind::Credential => "no credentials",
            ErrorKind::InsufficientFunds => "insufficient balance",
            ErrorKind::UnknownAsset => "unknown asset",
            ErrorKind::Quote => "price quote failed",
            ErrorKind::Payment => "transaction failed",
            ErrorKind::Issuance => "access credential rejected",
            ErrorKind::Retrieval => "download failed",
            ErrorKind::Storage => "storage failure",
            ErrorKind::Config => "invalid configuration",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.describe())
    }
}

/// Error type covering every acquisition operation.
#[derive(Debug, thiserror::Error)]
pub enum AcquireError {
    #[error("Credential error: {0}")]
    Credential(String),

    #[error("Invalid passphrase")]
    InvalidPassphrase,

    #[error("Insufficient balance: {balance}")]
    InsufficientFunds { balance: String },

    #[error("Unknown asset: {0}")]
    UnknownAsset(String),

    #[error("Quote error: {0}")]
    Quote(String),

    #[error("Price quote expired at {valid_until} (now {now})")]
    QuoteExpired { valid_until: u64, now: u64 },

    #[error("Payment failed: {0}")]
    Payment(String),

    #[error("Credential issuance rejected: {0}")]
    Issuance(String),

    #[error("Retrieval failed: {0}")]
    Retrieval(String),

    #[error("Not authorized to retrieve {0}")]
    NotAuthorized(String),

    #[error("Asset content not found: {0}")]
    NotFound(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Key derivation failed: {0}")]
    DerivationFailed(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AcquireError {
    /// Map this error onto its failure category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AcquireError::Credential(_)
            | AcquireError::InvalidPassphrase
            | AcquireError::DerivationFailed(_)
            | AcquireError::EncryptionFailed(_)
            | AcquireError::DecryptionFailed(_) => ErrorKind::Credential,
            AcquireError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            AcquireError::UnknownAsset(_) => ErrorKind::UnknownAsset,
            AcquireError::Quote(_)
            | AcquireError::QuoteExpired { .. }
            | AcquireError::InvalidAmount(_) => ErrorKind::Quote,
            AcquireError::Payment(_) => ErrorKind::Payment,
            AcquireError::Issuance(_) => ErrorKind::Issuance,
            AcquireError::Retrieval(_)
            | AcquireError::NotAuthorized(_)
            | AcquireError::NotFound(_) => ErrorKind::Retrieval,
            AcquireError::StorageError(_)
            | AcquireError::SerializationError(_)
            | AcquireError::InvalidFileFormat(_)
            | AcquireError::Io(_) => ErrorKind::Storage,
            AcquireError::Config(_) => ErrorKind::Config,
        }
    }
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, AcquireError>;
