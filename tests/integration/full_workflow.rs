//! Integration test: full acquisition workflow.
//!
//! Tests the complete lifecycle against the bundled collaborators:
//! 1. Create a sealed keystore and load its identity
//! 2. Acquire datasets served from local `file://` mirrors
//! 3. Check the purchase log, the written files and the ledger
//! 4. Exercise each failure path and confirm nothing is recorded

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ocean_acquire::access::DeterministicIssuer;
use ocean_acquire::catalog::{default_assets, StaticCatalog};
use ocean_acquire::identity::{create_keystore, load_identity, unlock_keystore};
use ocean_acquire::time::FixedClock;
use ocean_acquire::{
    AcquirerBuilder, AssetDescriptor, Balance, ErrorKind, Identity, LedgerClient,
    LocatorRetrievalClient, PaymentReceipt, PaymentRequest, RecordStatus, RecordStore,
    RecordingObserver, SimulatedLedger, Stage,
};

const NOW: u64 = 1_718_000_000;

/// Ledger wrapper counting payment submissions.
struct CountingLedger {
    inner: SimulatedLedger,
    payments: Arc<AtomicUsize>,
}

impl LedgerClient for CountingLedger {
    fn balance(&self, identity: &Identity) -> ocean_acquire::Result<Balance> {
        self.inner.balance(identity)
    }

    fn submit_payment(&self, request: &PaymentRequest) -> ocean_acquire::Result<PaymentReceipt> {
        self.payments.fetch_add(1, Ordering::SeqCst);
        self.inner.submit_payment(request)
    }

    fn payment_status(&self, tx_hash: &str) -> ocean_acquire::Result<PaymentReceipt> {
        self.inner.payment_status(tx_hash)
    }
}

struct Marketplace {
    _dir: tempfile::TempDir,
    mirror: PathBuf,
    output: PathBuf,
    records: RecordStore,
    payments: Arc<AtomicUsize>,
}

impl Marketplace {
    /// A temp directory holding local copies of the default datasets.
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let mirror = dir.path().join("mirror");
        std::fs::create_dir_all(&mirror).unwrap();
        std::fs::write(
            mirror.join("enron.csv"),
            "message_id,from,to,subject\n1,kenneth.lay,jeff.skilling,Q3\n",
        )
        .unwrap();
        std::fs::write(mirror.join("cameroon.json"), r#"{"gazette": ["decree 1"]}"#).unwrap();

        let output = dir.path().join("purchases");
        let records = RecordStore::new(output.join("purchase_records.json"));
        Self {
            _dir: dir,
            mirror,
            output,
            records,
            payments: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn assets(&self) -> Vec<AssetDescriptor> {
        default_assets()
            .into_iter()
            .map(|mut asset| {
                let source = self.mirror.join(format!("{}.{}", asset.key, asset.format));
                asset.locator = format!("file://{}", source.display());
                asset
            })
            .collect()
    }

    fn builder(&self, ledger: SimulatedLedger) -> AcquirerBuilder {
        AcquirerBuilder::new(
            StaticCatalog::new(self.assets()),
            CountingLedger {
                inner: ledger,
                payments: Arc::clone(&self.payments),
            },
            DeterministicIssuer::default(),
            LocatorRetrievalClient::new(Duration::from_secs(5)).unwrap(),
            self.records.clone(),
        )
        .identity(Identity::new("0xabc", "k1", "3"))
        .clock(FixedClock::new(NOW))
        .output_dir(&self.output)
    }

    fn payments(&self) -> usize {
        self.payments.load(Ordering::SeqCst)
    }
}

fn file_exists(path: &Path) -> bool {
    std::fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}

#[test]
fn full_workflow_acquires_enron() {
    let market = Marketplace::new();
    let acquirer = market.builder(SimulatedLedger::default()).build();

    assert!(acquirer.acquire("enron"), "enron acquisition should succeed");

    let records = acquirer.list_records().unwrap();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.dataset, "enron");
    assert_eq!(record.status, RecordStatus::Completed);
    assert_eq!(record.wallet_address, "0xabc");
    assert_eq!(record.timestamp, NOW);
    assert_eq!(record.access_token.len(), 32);

    let written = market.output.join("enron_full_dataset.csv");
    assert_eq!(record.file_path, written.display().to_string());
    assert!(std::fs::read_to_string(&written).unwrap().starts_with("message_id"));
    assert_eq!(market.payments(), 1);
}

#[test]
fn full_workflow_from_sealed_keystore() {
    let market = Marketplace::new();
    let keystore = market.output.parent().unwrap().join("wallet.json");
    let created = create_keystore(&keystore, "correct horse").unwrap();

    let identity = load_identity(&keystore).unwrap();
    assert_eq!(identity, created);
    let key = unlock_keystore(&keystore, "correct horse").unwrap();

    let acquirer = market
        .builder(SimulatedLedger::default().require_authorization())
        .identity(identity.clone())
        .unlocked_key(key)
        .build();

    let outcome = acquirer.try_acquire("cameroon").expect("authorized purchase");
    assert_eq!(outcome.record.wallet_address, identity.holder_reference());
    assert_eq!(
        outcome.file_path,
        market.output.join("cameroon_full_dataset.json")
    );
}

#[test]
fn full_workflow_unauthorized_payment_without_unlock() {
    let market = Marketplace::new();
    let acquirer = market
        .builder(SimulatedLedger::default().require_authorization())
        .build();

    let failure = acquirer.try_acquire("enron").unwrap_err();
    assert_eq!(failure.stage, Stage::ExecutePayment);
    assert_eq!(failure.kind(), ErrorKind::Payment);
    assert!(market.records.list_all().unwrap().is_empty());
}

#[test]
fn full_workflow_insufficient_funds_leaves_log_unchanged() {
    let market = Marketplace::new();
    let acquirer = market
        .builder(SimulatedLedger::new(
            "0 OCEAN".parse().unwrap(),
            "0.25 ETH".parse().unwrap(),
        ))
        .build();

    assert!(!acquirer.acquire("enron"));
    let failure = acquirer.try_acquire("enron").unwrap_err();
    assert_eq!(failure.kind(), ErrorKind::InsufficientFunds);
    assert_eq!(failure.kind().describe(), "insufficient balance");
    assert!(market.records.list_all().unwrap().is_empty());
    assert_eq!(market.payments(), 0);
}

#[test]
fn full_workflow_unknown_asset_makes_no_payment() {
    let market = Marketplace::new();
    let observer = Arc::new(RecordingObserver::new());
    let acquirer = market
        .builder(SimulatedLedger::default())
        .observer(Arc::clone(&observer))
        .build();

    assert!(!acquirer.acquire("unknown_key"));
    assert_eq!(market.payments(), 0);
    assert!(market.records.list_all().unwrap().is_empty());
    assert_eq!(
        observer.completed_stages(),
        [Stage::Authenticate, Stage::VerifyFunds]
    );
}

#[test]
fn full_workflow_missing_credentials() {
    let market = Marketplace::new();
    let acquirer = AcquirerBuilder::new(
        StaticCatalog::new(market.assets()),
        SimulatedLedger::default(),
        DeterministicIssuer::default(),
        LocatorRetrievalClient::new(Duration::from_secs(5)).unwrap(),
        market.records.clone(),
    )
    .output_dir(&market.output)
    .build();

    let failure = acquirer.try_acquire("enron").unwrap_err();
    assert_eq!(failure.stage, Stage::Authenticate);
    assert_eq!(failure.kind().describe(), "no credentials");
}

#[test]
fn full_workflow_retrieval_failure_after_payment() {
    let market = Marketplace::new();
    std::fs::remove_file(market.mirror.join("enron.csv")).unwrap();
    let acquirer = market.builder(SimulatedLedger::default()).build();

    let failure = acquirer.try_acquire("enron").unwrap_err();
    assert_eq!(failure.stage, Stage::RetrieveAndPersist);
    assert_eq!(failure.kind().describe(), "download failed");
    assert!(failure.payment_made(), "payment is not reversed");
    assert_eq!(market.payments(), 1);
    assert!(market.records.list_all().unwrap().is_empty());
    assert!(!file_exists(&market.output.join("enron_full_dataset.csv")));
}

#[test]
fn full_workflow_enron_then_cameroon_in_order() {
    let market = Marketplace::new();
    let acquirer = market.builder(SimulatedLedger::default()).build();

    assert!(acquirer.acquire("enron"));
    assert!(acquirer.acquire("cameroon"));

    let datasets: Vec<String> = acquirer
        .list_records()
        .unwrap()
        .into_iter()
        .map(|r| r.dataset)
        .collect();
    assert_eq!(datasets, ["enron", "cameroon"]);
    assert!(file_exists(&market.output.join("enron_full_dataset.csv")));
    assert!(file_exists(&market.output.join("cameroon_full_dataset.json")));
}

#[test]
fn full_workflow_acquire_all_continues_past_failure() {
    let market = Marketplace::new();
    std::fs::remove_file(market.mirror.join("enron.csv")).unwrap();
    let acquirer = market.builder(SimulatedLedger::default()).build();

    let results = acquirer.acquire_all();
    assert_eq!(results.len(), 2);
    assert!(results[0].is_err());
    assert!(results[1].is_ok());

    let records = acquirer.list_records().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].dataset, "cameroon");
}

#[test]
fn full_workflow_records_survive_new_acquirer() {
    let market = Marketplace::new();
    assert!(market.builder(SimulatedLedger::default()).build().acquire("enron"));

    let second = market.builder(SimulatedLedger::default()).build();
    assert!(second.acquire("cameroon"));
    assert_eq!(second.list_records().unwrap().len(), 2);
}
