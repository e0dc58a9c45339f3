//! In-memory ledger.
//!
//! Holds one holder balance, debits confirmed payments, and can be told to
//! keep payments pending for a number of status polls or to insist on an
//! authorization tag.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::catalog::{Price, TokenAmount};
use crate::error::{AcquireError, Result};
use crate::identity::Identity;

use super::payment::{Balance, PaymentReceipt, PaymentRequest, PaymentStatus};
use super::LedgerClient;

/// Block height the simulated chain starts from.
const BASE_BLOCK_NUMBER: u64 = 18_500_000;

/// Gas reported for every payment.
const PAYMENT_GAS_USED: u64 = 45_000;

#[derive(Debug)]
struct TrackedPayment {
    receipt: PaymentReceipt,
    polls_until_confirmed: u32,
}

#[derive(Debug)]
struct LedgerState {
    balance: TokenAmount,
    payments: HashMap<String, TrackedPayment>,
    submissions: usize,
}

/// A ledger simulated in memory.
#[derive(Debug)]
pub struct SimulatedLedger {
    currency: String,
    gas: Price,
    pending_polls: u32,
    require_authorization: bool,
    state: Mutex<LedgerState>,
}

impl SimulatedLedger {
    /// Create a ledger holding `balance` for the holder.
    pub fn new(balance: Price, gas: Price) -> Self {
        Self {
            currency: balance.currency,
            gas,
            pending_polls: 0,
            require_authorization: false,
            state: Mutex::new(LedgerState {
                balance: balance.amount,
                payments: HashMap::new(),
                submissions: 0,
            }),
        }
    }

    /// Report new payments as pending for `polls` status queries.
    pub fn with_pending_polls(mut self, polls: u32) -> Self {
        self.pending_polls = polls;
        self
    }

    /// Fail payments that carry no authorization tag.
    pub fn require_authorization(mut self) -> Self {
        self.require_authorization = true;
        self
    }

    /// Number of payments submitted so far, successful or not.
    pub fn submissions(&self) -> usize {
        self.state.lock().map(|s| s.submissions).unwrap_or(0)
    }

    /// Remaining balance in the payment token.
    pub fn remaining(&self) -> Result<Price> {
        let state = self.lock()?;
        Ok(Price::new(state.balance, self.currency.clone()))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, LedgerState>> {
        self.state
            .lock()
            .map_err(|_| AcquireError::Payment("ledger state lock poisoned".to_string()))
    }

    fn rejection(&self, request: &PaymentRequest, balance: TokenAmount) -> Option<String> {
        if request.amount.currency != self.currency {
            return Some(format!(
                "ledger settles in {}, payment requested in {}",
                self.currency, request.amount.currency
            ));
        }
        if self.require_authorization && request.authorization.is_none() {
            return Some("payment is not authorized by the holder key".to_string());
        }
        if request.amount.amount > balance {
            return Some(format!(
                "balance {} {} below price {}",
                balance, self.currency, request.amount
            ));
        }
        None
    }
}

impl Default for SimulatedLedger {
    /// 10.5 OCEAN and 0.25 ETH.
    fn default() -> Self {
        Self::new(
            Price::new(TokenAmount::from_base_units(10_500_000_000_000_000_000), "OCEAN"),
            Price::new(TokenAmount::from_base_units(250_000_000_000_000_000), "ETH"),
        )
    }
}

impl LedgerClient for SimulatedLedger {
    fn balance(&self, identity: &Identity) -> Result<Balance> {
        let state = self.lock()?;
        log::debug!("balance query for {}", identity.holder_reference());
        Ok(Balance {
            token: Price::new(state.balance, self.currency.clone()),
            gas: self.gas.clone(),
            sufficient: !state.balance.is_zero(),
        })
    }

    fn submit_payment(&self, request: &PaymentRequest) -> Result<PaymentReceipt> {
        let mut state = self.lock()?;
        state.submissions += 1;

        let rejection = self.rejection(request, state.balance);
        let status = match (&rejection, self.pending_polls) {
            (Some(reason), _) => {
                log::warn!("payment for {} rejected: {reason}", request.asset_key);
                PaymentStatus::Failed
            }
            (None, 0) => PaymentStatus::Confirmed,
            (None, _) => PaymentStatus::Pending,
        };

        if rejection.is_none() {
            state.balance = state
                .balance
                .checked_sub(request.amount.amount)
                .unwrap_or(TokenAmount::ZERO);
        }

        let receipt = PaymentReceipt {
            tx_hash: request.transaction_hash(),
            status,
            block_number: BASE_BLOCK_NUMBER + request.issued_at % 1000,
            gas_used: PAYMENT_GAS_USED,
            timestamp: request.issued_at,
        };

        state.payments.insert(
            receipt.tx_hash.clone(),
            TrackedPayment {
                receipt: receipt.clone(),
                polls_until_confirmed: self.pending_polls,
            },
        );

        Ok(receipt)
    }

    fn payment_status(&self, tx_hash: &str) -> Result<PaymentReceipt> {
        let mut state = self.lock()?;
        let tracked = state
            .payments
            .get_mut(tx_hash)
            .ok_or_else(|| AcquireError::Payment(format!("unknown transaction {tx_hash}")))?;

        if tracked.receipt.status == PaymentStatus::Pending {
            tracked.polls_until_confirmed = tracked.polls_until_confirmed.saturating_sub(1);
            if tracked.polls_until_confirmed == 0 {
                tracked.receipt.status = PaymentStatus::Confirmed;
            }
        }

        Ok(tracked.receipt.clone())
    }
}
