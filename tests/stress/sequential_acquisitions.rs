//! Scale test: many sequential acquisitions against one record log.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use ocean_acquire::access::DeterministicIssuer;
use ocean_acquire::catalog::{Price, StaticCatalog};
use ocean_acquire::time::{Clock, FixedClock};
use ocean_acquire::{
    AcquirerBuilder, AssetDescriptor, ErrorKind, Identity, LocatorRetrievalClient, RecordStore,
    SimulatedLedger, Stage,
};

/// Lets the test advance a clock the acquirer owns.
struct SharedClock(Arc<FixedClock>);

impl Clock for SharedClock {
    fn now_secs(&self) -> u64 {
        self.0.now_secs()
    }
}

fn mirrored_assets(dir: &Path, count: usize, price: &str) -> Vec<AssetDescriptor> {
    let price: Price = price.parse().unwrap();
    (0..count)
        .map(|i| {
            let source = dir.join(format!("dataset_{i}.csv"));
            std::fs::write(&source, format!("id,value\n{i},{}\n", i * 7)).unwrap();
            AssetDescriptor {
                key: format!("dataset_{i}"),
                did: format!("did:op:{i:064x}"),
                name: format!("Dataset {i}"),
                format: "csv".to_string(),
                locator: format!("file://{}", source.display()),
                price: price.clone(),
            }
        })
        .collect()
}

#[test]
fn stress_100_assets_in_catalog_order() {
    let tmp = tempfile::tempdir().unwrap();
    let mirror = tmp.path().join("mirror");
    std::fs::create_dir_all(&mirror).unwrap();
    let assets = mirrored_assets(&mirror, 100, "0.01 OCEAN");
    let keys: Vec<String> = assets.iter().map(|a| a.key.clone()).collect();

    let records = RecordStore::new(tmp.path().join("out/purchase_records.json"));
    let acquirer = AcquirerBuilder::new(
        StaticCatalog::new(assets),
        SimulatedLedger::default(),
        DeterministicIssuer::default(),
        LocatorRetrievalClient::new(Duration::from_secs(5)).unwrap(),
        records.clone(),
    )
    .identity(Identity::new("0xabc", "k1", "3"))
    .clock(FixedClock::new(1_700_000_000))
    .output_dir(tmp.path().join("out"))
    .build();

    let results = acquirer.acquire_all();
    assert_eq!(results.len(), 100);
    assert!(results.iter().all(|r| r.is_ok()));

    let logged: Vec<String> = records
        .list_all()
        .unwrap()
        .into_iter()
        .map(|r| r.dataset)
        .collect();
    assert_eq!(logged, keys);

    // Every token is distinct.
    let mut tokens: Vec<String> = results
        .into_iter()
        .map(|r| r.unwrap().credential.token)
        .collect();
    tokens.sort();
    tokens.dedup();
    assert_eq!(tokens.len(), 100);
}

#[test]
fn stress_repeated_purchases_of_one_asset() {
    let tmp = tempfile::tempdir().unwrap();
    let assets = mirrored_assets(tmp.path(), 1, "0.1 OCEAN");
    let clock = Arc::new(FixedClock::new(1_700_000_000));

    let records = RecordStore::new(tmp.path().join("purchase_records.json"));
    let acquirer = AcquirerBuilder::new(
        StaticCatalog::new(assets),
        SimulatedLedger::default(),
        DeterministicIssuer::default(),
        LocatorRetrievalClient::new(Duration::from_secs(5)).unwrap(),
        records.clone(),
    )
    .identity(Identity::new("0xabc", "k1", "3"))
    .clock(SharedClock(Arc::clone(&clock)))
    .output_dir(tmp.path().join("out"))
    .build();

    for _ in 0..50 {
        assert!(acquirer.acquire("dataset_0"));
        clock.advance(1);
    }

    let logged = records.list_all().unwrap();
    assert_eq!(logged.len(), 50);
    assert!(logged.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
}

#[test]
fn stress_balance_runs_out() {
    let tmp = tempfile::tempdir().unwrap();
    let assets = mirrored_assets(tmp.path(), 15, "0.1 OCEAN");

    let records = RecordStore::new(tmp.path().join("purchase_records.json"));
    let acquirer = AcquirerBuilder::new(
        StaticCatalog::new(assets),
        SimulatedLedger::new("1 OCEAN".parse().unwrap(), "0.25 ETH".parse().unwrap()),
        DeterministicIssuer::default(),
        LocatorRetrievalClient::new(Duration::from_secs(5)).unwrap(),
        records.clone(),
    )
    .identity(Identity::new("0xabc", "k1", "3"))
    .clock(FixedClock::new(1_700_000_000))
    .output_dir(tmp.path().join("out"))
    .build();

    let results = acquirer.acquire_all();
    let succeeded = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(succeeded, 10);

    for failure in results.into_iter().skip(10).map(|r| r.unwrap_err()) {
        assert_eq!(failure.stage, Stage::VerifyFunds);
        assert_eq!(failure.kind(), ErrorKind::InsufficientFunds);
    }
    assert_eq!(records.list_all().unwrap().len(), 10);
}
