//! ocean-acquire — Dataset acquisition for Ocean Protocol marketplaces.
//!
//! Drives a dataset purchase from wallet authentication through payment,
//! access credential issuance and retrieval, and keeps an append-only log
//! of completed acquisitions.

pub mod access;
pub mod catalog;
pub mod config;
pub mod crypto;
pub mod error;
pub mod identity;
pub mod ledger;
pub mod orchestrator;
pub mod retrieval;
pub mod storage;
pub mod time;

// Re-export primary types
pub use config::AcquirerConfig;
pub use error::{AcquireError, ErrorKind, Result};
pub use identity::{Identity, UnlockedKey};
pub use orchestrator::{
    Acquirer, AcquirerBuilder, AcquisitionFailure, AcquisitionObserver, AcquisitionOutcome,
    LogObserver, RecordingObserver, Stage, StageEvent,
};

// Re-export collaborator interfaces
pub use access::{AccessCredential, CredentialIssuer, DeterministicIssuer};
pub use catalog::{AssetDescriptor, CatalogClient, Price, PriceQuote, StaticCatalog, TokenAmount};
pub use ledger::{
    Balance, LedgerClient, PaymentReceipt, PaymentRequest, PaymentStatus, SimulatedLedger,
};
pub use retrieval::{LocatorRetrievalClient, RetrievalClient};
pub use storage::{AcquisitionRecord, RecordStatus, RecordStore};
