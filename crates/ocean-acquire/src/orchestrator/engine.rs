//! Acquirer — runs the acquisition workflow against injected collaborators.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::access::{AccessCredential, CredentialIssuer};
use crate::catalog::{AssetDescriptor, CatalogClient, PriceQuote};
use crate::config::AcquirerConfig;
use crate::error::{AcquireError, ErrorKind, Result};
use crate::identity::{Identity, UnlockedKey};
use crate::ledger::{LedgerClient, PaymentReceipt, PaymentRequest, PaymentStatus};
use crate::retrieval::{LocatorRetrievalClient, RetrievalClient};
use crate::storage::{write_atomic, AcquisitionRecord, RecordStatus, RecordStore};
use crate::time::{Clock, SystemClock};

use super::observer::{AcquisitionObserver, LogObserver, StageEvent};
use super::Stage;

/// Status polls allowed while a payment is pending, unless configured.
const DEFAULT_MAX_POLLS: u32 = 10;

/// Everything produced by a successful acquisition.
#[derive(Debug, Clone)]
pub struct AcquisitionOutcome {
    pub asset: AssetDescriptor,
    pub quote: PriceQuote,
    pub receipt: PaymentReceipt,
    pub credential: AccessCredential,
    pub record: AcquisitionRecord,
    /// Where the asset content was written.
    pub file_path: PathBuf,
}

/// A failed acquisition: the stage that failed and why.
#[derive(Debug, thiserror::Error)]
#[error("{stage} failed for {asset_key}: {error}")]
pub struct AcquisitionFailure {
    pub asset_key: String,
    pub stage: Stage,
    #[source]
    pub error: AcquireError,
    /// The confirmed payment made before the failure, if any. It is not reversed.
    pub payment: Option<PaymentReceipt>,
}

impl AcquisitionFailure {
    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }

    pub fn payment_made(&self) -> bool {
        self.payment.is_some()
    }
}

/// Assembles an [`Acquirer`].
pub struct AcquirerBuilder {
    catalog: Box<dyn CatalogClient>,
    ledger: Box<dyn LedgerClient>,
    issuer: Box<dyn CredentialIssuer>,
    retrieval: Box<dyn RetrievalClient>,
    records: RecordStore,
    identity: Option<Identity>,
    unlocked_key: Option<UnlockedKey>,
    observer: Box<dyn AcquisitionObserver>,
    clock: Box<dyn Clock>,
    output_dir: PathBuf,
    enforce_quote_expiry: bool,
    max_polls: u32,
    poll_interval: Duration,
}

impl AcquirerBuilder {
    /// Start from the four collaborators and the record log.
    pub fn new(
        catalog: impl CatalogClient + 'static,
        ledger: impl LedgerClient + 'static,
        issuer: impl CredentialIssuer + 'static,
        retrieval: impl RetrievalClient + 'static,
        records: RecordStore,
    ) -> Self {
        Self {
            catalog: Box::new(catalog),
            ledger: Box::new(ledger),
            issuer: Box::new(issuer),
            retrieval: Box::new(retrieval),
            records,
            identity: None,
            unlocked_key: None,
            observer: Box::new(LogObserver::default()),
            clock: Box::new(SystemClock),
            output_dir: PathBuf::from("./purchases"),
            enforce_quote_expiry: true,
            max_polls: DEFAULT_MAX_POLLS,
            poll_interval: Duration::ZERO,
        }
    }

    /// Wire up the default collaborators described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `AcquireError::Config` if the configuration is invalid or the
    /// HTTP client cannot be built.
    pub fn from_config(config: &AcquirerConfig) -> Result<Self> {
        config.validate()?;
        let retrieval = LocatorRetrievalClient::new(config.request_timeout())?;
        Ok(Self::new(
            config.catalog(),
            config.simulated_ledger(),
            config.issuer(),
            retrieval,
            config.record_store(),
        )
        .output_dir(&config.output_dir)
        .enforce_quote_expiry(config.enforce_quote_expiry)
        .confirmation(config.confirmation_max_polls, config.confirmation_poll_interval()))
    }

    pub fn identity(mut self, identity: Identity) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Authorize every payment with `key`.
    pub fn unlocked_key(mut self, key: UnlockedKey) -> Self {
        self.unlocked_key = Some(key);
        self
    }

    pub fn observer(mut self, observer: impl AcquisitionObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.output_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn enforce_quote_expiry(mut self, enforce: bool) -> Self {
        self.enforce_quote_expiry = enforce;
        self
    }

    /// Bound the wait for a pending payment.
    pub fn confirmation(mut self, max_polls: u32, interval: Duration) -> Self {
        self.max_polls = max_polls;
        self.poll_interval = interval;
        self
    }

    pub fn build(self) -> Acquirer {
        Acquirer {
            catalog: self.catalog,
            ledger: self.ledger,
            issuer: self.issuer,
            retrieval: self.retrieval,
            records: self.records,
            identity: self.identity,
            unlocked_key: self.unlocked_key,
            observer: self.observer,
            clock: self.clock,
            output_dir: self.output_dir,
            enforce_quote_expiry: self.enforce_quote_expiry,
            max_polls: self.max_polls,
            poll_interval: self.poll_interval,
        }
    }
}

/// Runs acquisitions for one holder identity.
///
/// The identity is fixed at construction. Acquisitions run one at a time on
/// the calling thread.
pub struct Acquirer {
    catalog: Box<dyn CatalogClient>,
    ledger: Box<dyn LedgerClient>,
    issuer: Box<dyn CredentialIssuer>,
    retrieval: Box<dyn RetrievalClient>,
    records: RecordStore,
    identity: Option<Identity>,
    unlocked_key: Option<UnlockedKey>,
    observer: Box<dyn AcquisitionObserver>,
    clock: Box<dyn Clock>,
    output_dir: PathBuf,
    enforce_quote_expiry: bool,
    max_polls: u32,
    poll_interval: Duration,
}

impl Acquirer {
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Catalog listing, in order.
    pub fn assets(&self) -> Vec<AssetDescriptor> {
        self.catalog.assets()
    }

    /// Acquire `asset_key`. Returns `true` only if all seven stages completed.
    pub fn acquire(&self, asset_key: &str) -> bool {
        self.try_acquire(asset_key).is_ok()
    }

    /// Acquire `asset_key`, reporting the failing stage on error.
    pub fn try_acquire(
        &self,
        asset_key: &str,
    ) -> std::result::Result<AcquisitionOutcome, AcquisitionFailure> {
        self.observer.on_event(&StageEvent::WorkflowStarted {
            asset_key: asset_key.to_string(),
        });
        let result = self.run(asset_key);
        self.observer.on_event(&StageEvent::WorkflowFinished {
            asset_key: asset_key.to_string(),
            success: result.is_ok(),
        });
        result
    }

    /// Acquire every listed asset in catalog order. A failure does not stop
    /// the remaining acquisitions.
    pub fn acquire_all(&self) -> Vec<std::result::Result<AcquisitionOutcome, AcquisitionFailure>> {
        self.catalog
            .assets()
            .iter()
            .map(|asset| self.try_acquire(&asset.key))
            .collect()
    }

    /// Every record in the purchase log, oldest first.
    pub fn list_records(&self) -> Result<Vec<AcquisitionRecord>> {
        self.records.list_all()
    }

    fn run(&self, asset_key: &str) -> std::result::Result<AcquisitionOutcome, AcquisitionFailure> {
        let identity = self.stage(asset_key, Stage::Authenticate, None, || {
            let identity = self.authenticate()?;
            let detail = format!("wallet connected: {}", identity.holder_reference());
            Ok((identity, detail))
        })?;

        self.stage(asset_key, Stage::VerifyFunds, None, || {
            let balance = self.ledger.balance(identity)?;
            if !balance.sufficient {
                return Err(AcquireError::InsufficientFunds {
                    balance: balance.token.to_string(),
                });
            }
            Ok(((), format!("balance {} / {}", balance.token, balance.gas)))
        })?;

        let (asset, quote) = self.stage(asset_key, Stage::QuotePrice, None, || {
            let asset = self.catalog.resolve(asset_key)?;
            let quote = self.catalog.quote(&asset, self.clock.now_secs())?;
            let detail = format!(
                "{} priced at {} (gas ~{}), valid until {}",
                asset.name,
                quote.price,
                quote.gas_estimate,
                crate::time::secs_to_rfc3339(quote.valid_until)
            );
            Ok(((asset, quote), detail))
        })?;

        self.stage(asset_key, Stage::Authorize, None, || {
            Ok(((), format!("purchase approved: paying {}", quote.price)))
        })?;

        let receipt = self.stage(asset_key, Stage::ExecutePayment, None, || {
            let receipt = self.execute_payment(identity, &asset, &quote)?;
            let detail = format!(
                "transaction {} confirmed in block {}",
                receipt.short_hash(),
                receipt.block_number
            );
            Ok((receipt, detail))
        })?;

        let credential = self.stage(asset_key, Stage::IssueCredential, Some(&receipt), || {
            let now = self.clock.now_secs();
            let credential = self.issuer.issue(&receipt, asset_key, identity, now)?;
            let detail = format!("access token {}", credential.redacted());
            Ok((credential, detail))
        })?;

        let (record, file_path) =
            self.stage(asset_key, Stage::RetrieveAndPersist, Some(&receipt), || {
                let persisted = self
                    .retrieve_and_persist(identity, &asset, &credential)
                    .map_err(as_retrieval_error)?;
                let detail = format!("saved to {}", persisted.1.display());
                Ok((persisted, detail))
            })?;

        Ok(AcquisitionOutcome {
            asset,
            quote,
            receipt,
            credential,
            record,
            file_path,
        })
    }

    /// Run one stage, reporting its start and its outcome to the observer.
    fn stage<T>(
        &self,
        asset_key: &str,
        stage: Stage,
        payment: Option<&PaymentReceipt>,
        body: impl FnOnce() -> Result<(T, String)>,
    ) -> std::result::Result<T, AcquisitionFailure> {
        self.observer.on_event(&StageEvent::StageStarted {
            asset_key: asset_key.to_string(),
            stage,
        });

        match body() {
            Ok((value, detail)) => {
                self.observer.on_event(&StageEvent::StageCompleted {
                    asset_key: asset_key.to_string(),
                    stage,
                    detail,
                });
                Ok(value)
            }
            Err(error) => {
                self.observer.on_event(&StageEvent::StageFailed {
                    asset_key: asset_key.to_string(),
                    stage,
                    kind: error.kind(),
                    message: error.to_string(),
                    payment_made: payment.is_some(),
                });
                Err(AcquisitionFailure {
                    asset_key: asset_key.to_string(),
                    stage,
                    error,
                    payment: payment.cloned(),
                })
            }
        }
    }

    fn authenticate(&self) -> Result<&Identity> {
        let identity = self
            .identity
            .as_ref()
            .ok_or_else(|| AcquireError::Credential("no wallet loaded".to_string()))?;
        if !identity.is_well_formed() {
            return Err(AcquireError::Credential(
                "wallet has no holder address".to_string(),
            ));
        }
        Ok(identity)
    }

    fn execute_payment(
        &self,
        identity: &Identity,
        asset: &AssetDescriptor,
        quote: &PriceQuote,
    ) -> Result<PaymentReceipt> {
        let now = self.clock.now_secs();
        if self.enforce_quote_expiry && quote.is_expired_at(now) {
            return Err(AcquireError::QuoteExpired {
                valid_until: quote.valid_until,
                now,
            });
        }

        let mut request = PaymentRequest::new(identity, asset, quote, now);
        if let Some(key) = &self.unlocked_key {
            request = request.authorize(key)?;
        }

        let mut receipt = self.ledger.submit_payment(&request)?;
        let mut polls = 0;
        while !receipt.status.is_terminal() {
            if polls >= self.max_polls {
                return Err(AcquireError::Payment(format!(
                    "transaction {} still pending after {polls} status checks",
                    receipt.short_hash()
                )));
            }
            if !self.poll_interval.is_zero() {
                std::thread::sleep(self.poll_interval);
            }
            receipt = self.ledger.payment_status(&receipt.tx_hash)?;
            polls += 1;
        }

        if receipt.status != PaymentStatus::Confirmed {
            return Err(AcquireError::Payment(format!(
                "transaction {} {}",
                receipt.short_hash(),
                receipt.status
            )));
        }
        Ok(receipt)
    }

    fn retrieve_and_persist(
        &self,
        identity: &Identity,
        asset: &AssetDescriptor,
        credential: &AccessCredential,
    ) -> Result<(AcquisitionRecord, PathBuf)> {
        let content = self.retrieval.fetch(asset, credential)?;
        let file_path = self.output_dir.join(asset.destination_file_name());
        write_atomic(&file_path, &content)?;

        let record = AcquisitionRecord {
            dataset: asset.key.clone(),
            timestamp: self.clock.now_secs(),
            access_token: credential.token.clone(),
            file_path: file_path.display().to_string(),
            wallet_address: identity.holder_reference(),
            status: RecordStatus::Completed,
        };
        self.records.append(&record)?;
        Ok((record, file_path))
    }
}

/// Anything going wrong while fetching or persisting counts as a failed download.
fn as_retrieval_error(error: AcquireError) -> AcquireError {
    match error.kind() {
        ErrorKind::Retrieval => error,
        _ => AcquireError::Retrieval(error.to_string()),
    }
}
