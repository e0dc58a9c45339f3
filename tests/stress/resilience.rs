//! Resilience tests: corrupted logs, wrong passphrases, tampered keystores.

use std::time::Duration;

use ocean_acquire::access::DeterministicIssuer;
use ocean_acquire::catalog::{default_assets, StaticCatalog};
use ocean_acquire::identity::{create_keystore, load_identity, unlock_keystore};
use ocean_acquire::time::FixedClock;
use ocean_acquire::{
    AcquireError, AcquirerBuilder, AcquisitionRecord, ErrorKind, Identity, LocatorRetrievalClient,
    RecordStatus, RecordStore, SimulatedLedger, Stage,
};

fn record(dataset: &str) -> AcquisitionRecord {
    AcquisitionRecord {
        dataset: dataset.to_string(),
        timestamp: 1_700_000_000,
        access_token: "0123456789abcdef0123456789abcdef".to_string(),
        file_path: format!("purchases/{dataset}_full_dataset.csv"),
        wallet_address: "0xabc".to_string(),
        status: RecordStatus::Completed,
    }
}

#[test]
fn resilience_corrupted_record_log_is_not_overwritten() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("purchase_records.json");
    std::fs::write(&path, b"[{\"dataset\": \"enr").unwrap();

    let store = RecordStore::new(&path);
    assert!(matches!(
        store.list_all(),
        Err(AcquireError::InvalidFileFormat(_))
    ));
    assert!(store.append(&record("enron")).is_err());
    assert_eq!(std::fs::read(&path).unwrap(), b"[{\"dataset\": \"enr");
}

#[test]
fn resilience_corrupted_log_fails_acquisition_at_persist() {
    let tmp = tempfile::tempdir().unwrap();
    let source = tmp.path().join("enron.csv");
    std::fs::write(&source, "from,to\n").unwrap();
    let mut assets = default_assets();
    assets[0].locator = format!("file://{}", source.display());

    let log = tmp.path().join("purchase_records.json");
    std::fs::write(&log, "not json").unwrap();

    let acquirer = AcquirerBuilder::new(
        StaticCatalog::new(assets),
        SimulatedLedger::default(),
        DeterministicIssuer::default(),
        LocatorRetrievalClient::new(Duration::from_secs(5)).unwrap(),
        RecordStore::new(&log),
    )
    .identity(Identity::new("0xabc", "k1", "3"))
    .clock(FixedClock::new(1_700_000_000))
    .output_dir(tmp.path().join("out"))
    .build();

    let failure = acquirer.try_acquire("enron").unwrap_err();
    assert_eq!(failure.stage, Stage::RetrieveAndPersist);
    assert_eq!(failure.kind(), ErrorKind::Retrieval);
    assert!(failure.payment_made());
    assert_eq!(std::fs::read_to_string(&log).unwrap(), "not json");
}

#[test]
fn resilience_blank_log_reads_as_empty() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("purchase_records.json");
    std::fs::write(&path, "  \n").unwrap();

    let store = RecordStore::new(&path);
    assert!(store.list_all().unwrap().is_empty());
    store.append(&record("enron")).unwrap();
    assert_eq!(store.list_all().unwrap().len(), 1);
}

#[test]
fn resilience_wrong_passphrase_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("wallet.json");
    create_keystore(&path, "correct_password").unwrap();

    let result = unlock_keystore(&path, "wrong_password");
    assert!(matches!(result, Err(AcquireError::InvalidPassphrase)));
}

#[test]
fn resilience_tampered_ciphertext_detected() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("wallet.json");
    create_keystore(&path, "test_pass").unwrap();

    let mut doc: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    let ciphertext = doc["crypto"]["ciphertext"].as_str().unwrap().to_string();
    let flipped = if ciphertext.starts_with('A') { "B" } else { "A" };
    doc["crypto"]["ciphertext"] =
        serde_json::Value::String(format!("{flipped}{}", &ciphertext[1..]));
    std::fs::write(&path, serde_json::to_vec(&doc).unwrap()).unwrap();

    assert!(unlock_keystore(&path, "test_pass").is_err());
    // Public fields stay readable.
    assert!(load_identity(&path).unwrap().is_well_formed());
}

#[test]
fn resilience_truncated_keystore_detected() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("wallet.json");
    create_keystore(&path, "test_pass").unwrap();

    let data = std::fs::read(&path).unwrap();
    std::fs::write(&path, &data[..data.len() / 2]).unwrap();

    assert!(matches!(
        load_identity(&path),
        Err(AcquireError::InvalidFileFormat(_))
    ));
    assert!(unlock_keystore(&path, "test_pass").is_err());
}

#[test]
fn resilience_unsealed_keystore_cannot_unlock() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("wallet.json");
    std::fs::write(&path, r#"{"address": "abc", "id": "k1", "version": 3}"#).unwrap();

    assert_eq!(load_identity(&path).unwrap().holder_reference(), "0xabc");
    assert!(matches!(
        unlock_keystore(&path, "anything"),
        Err(AcquireError::Credential(_))
    ));
}

#[test]
fn resilience_nonexistent_keystore() {
    let result = load_identity(std::path::Path::new(
        "/tmp/definitely_does_not_exist_12345/wallet.json",
    ));
    assert!(matches!(result, Err(AcquireError::Io(_))));
}
