//! Acquisition orchestrator — the seven-stage purchase workflow.
//!
//! [`Acquirer`] drives one asset through authentication, funding checks,
//! pricing, payment, credential issuance and retrieval. Each stage gates the
//! next; the first failure stops the run. A payment confirmed at
//! [`Stage::ExecutePayment`] is never reversed, so a later failure carries
//! the receipt for manual reconciliation.

pub mod engine;
pub mod observer;

pub use engine::{Acquirer, AcquirerBuilder, AcquisitionFailure, AcquisitionOutcome};
pub use observer::{AcquisitionObserver, LogObserver, RecordingObserver, StageEvent};

/// One step of the acquisition workflow, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    Authenticate,
    VerifyFunds,
    QuotePrice,
    Authorize,
    ExecutePayment,
    IssueCredential,
    RetrieveAndPersist,
}

impl Stage {
    pub const ALL: [Stage; 7] = [
        Stage::Authenticate,
        Stage::VerifyFunds,
        Stage::QuotePrice,
        Stage::Authorize,
        Stage::ExecutePayment,
        Stage::IssueCredential,
        Stage::RetrieveAndPersist,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Authenticate => "authenticate",
            Stage::VerifyFunds => "verify funds",
            Stage::QuotePrice => "quote price",
            Stage::Authorize => "authorize",
            Stage::ExecutePayment => "execute payment",
            Stage::IssueCredential => "issue credential",
            Stage::RetrieveAndPersist => "retrieve and persist",
        }
    }

    /// 1-based position in the workflow.
    pub fn number(&self) -> usize {
        *self as usize + 1
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
