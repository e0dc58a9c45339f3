//! Ledger — balances and payment execution.
//!
//! The orchestrator talks to the ledger through [`LedgerClient`]. On-chain
//! settlement is out of scope; [`SimulatedLedger`] stands in for the chain
//! with in-memory balance accounting.

pub mod payment;
pub mod simulated;

pub use payment::{Balance, PaymentReceipt, PaymentRequest, PaymentStatus};
pub use simulated::SimulatedLedger;

use std::sync::Arc;

use crate::error::Result;
use crate::identity::Identity;

/// Balance queries and payment submission.
pub trait LedgerClient {
    /// Current balances of `identity`.
    fn balance(&self, identity: &Identity) -> Result<Balance>;

    /// Submit a payment. The returned receipt may still be `Pending`.
    fn submit_payment(&self, request: &PaymentRequest) -> Result<PaymentReceipt>;

    /// Latest known state of a submitted payment.
    fn payment_status(&self, tx_hash: &str) -> Result<PaymentReceipt>;
}

impl<T: LedgerClient + ?Sized> LedgerClient for Arc<T> {
    fn balance(&self, identity: &Identity) -> Result<Balance> {
        (**self).balance(identity)
    }

    fn submit_payment(&self, request: &PaymentRequest) -> Result<PaymentReceipt> {
        (**self).submit_payment(request)
    }

    fn payment_status(&self, tx_hash: &str) -> Result<PaymentReceipt> {
        (**self).payment_status(tx_hash)
    }
}
