//! ocean-acquire CLI — `ocq` command.
//!
//! Acquires datasets from an Ocean Protocol marketplace, lists purchase
//! records, and manages the wallet keystore payments are made from.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};

use ocean_acquire::catalog::AquariusClient;
use ocean_acquire::identity::{create_keystore, load_identity, unlock_keystore, KeystoreFile};
use ocean_acquire::retrieval::{summarize, DatasetSummary};
use ocean_acquire::time::secs_to_display;
use ocean_acquire::{
    Acquirer, AcquirerBuilder, AcquirerConfig, AcquisitionFailure, AcquisitionOutcome,
    CatalogClient, LedgerClient, LogObserver,
};

// ── Defaults ──────────────────────────────────────────────────────────────────

const DEFAULT_KEYSTORE: &str = "wallet.json";
const PASSWORD_ENV: &str = "WALLET_PASSWORD";

// ── Passphrase helper ─────────────────────────────────────────────────────────

fn read_line(prompt: &str) -> Result<String> {
    eprint!("{prompt}");
    std::io::stderr().flush().ok();
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read from stdin")?;
    Ok(line.trim().to_string())
}

/// Passphrase from `WALLET_PASSWORD`, or prompted for.
fn read_passphrase(prompt: &str) -> Result<String> {
    match std::env::var(PASSWORD_ENV) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => read_line(prompt),
    }
}

// ── CLI structure ─────────────────────────────────────────────────────────────

/// ocean-acquire CLI — buy datasets from an Ocean Protocol marketplace and
/// keep a log of what was acquired.
#[derive(Parser, Debug)]
#[command(
    name = "ocq",
    about = "Ocean Protocol dataset acquisition",
    version,
    long_about = "ocq — Ocean Protocol dataset acquisition\n\nAuthenticate a wallet, pay for a dataset, obtain an access token,\ndownload the data and record the purchase."
)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Wallet keystore (overrides config and WALLET_KEYSTORE_PATH)
    #[arg(long, global = true)]
    keystore: Option<PathBuf>,

    /// Unlock the keystore so payments carry a holder authorization
    #[arg(long, global = true)]
    unlock: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the datasets that can be acquired
    Assets,

    /// Show the wallet identity and its balances
    Wallet,

    /// Create a new sealed wallet keystore
    Init {
        /// Overwrite an existing keystore
        #[arg(long)]
        force: bool,
    },

    /// Acquire one dataset
    Acquire {
        /// Catalog key of the dataset (e.g. enron, cameroon)
        asset: String,
    },

    /// Acquire every listed dataset, one after another
    AcquireAll,

    /// List purchase records
    Records {
        /// Print the records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Look up a dataset's published metadata
    Inspect {
        /// Catalog key of the dataset
        asset: String,
    },

    /// Summarize a downloaded dataset file
    Summarize {
        /// File to summarize
        file: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Interactive menu
    Menu,
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let result = run(&cli);

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;

    match &cli.command {
        Commands::Assets => cmd_assets(&config),
        Commands::Wallet => cmd_wallet(&config),
        Commands::Init { force } => cmd_init(&config, *force),
        Commands::Acquire { asset } => cmd_acquire(&build_acquirer(cli, &config)?, asset),
        Commands::AcquireAll => cmd_acquire_all(&build_acquirer(cli, &config)?),
        Commands::Records { json } => cmd_records(&config, *json),
        Commands::Inspect { asset } => cmd_inspect(&config, asset),
        Commands::Summarize { file, json } => cmd_summarize(file, *json),
        Commands::Menu => cmd_menu(&build_acquirer(cli, &config)?),
    }
}

// ── Setup ─────────────────────────────────────────────────────────────────────

fn load_config(cli: &Cli) -> Result<AcquirerConfig> {
    let mut config = match &cli.config {
        Some(path) => AcquirerConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => AcquirerConfig::default(),
    };
    config.apply_env();
    if let Some(path) = &cli.keystore {
        config.keystore_path = Some(path.clone());
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn keystore_path(config: &AcquirerConfig) -> PathBuf {
    config
        .keystore_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_KEYSTORE))
}

fn build_acquirer(cli: &Cli, config: &AcquirerConfig) -> Result<Acquirer> {
    let mut builder = AcquirerBuilder::from_config(config)
        .context("failed to set up acquirer")?
        .observer(LogObserver::new("ocq"));

    let path = keystore_path(config);
    match load_identity(&path) {
        Ok(identity) => {
            log::info!("wallet loaded: {}", identity.holder_reference());
            builder = builder.identity(identity);
        }
        // Acquisitions then fail at authentication with a clear cause.
        Err(e) => log::warn!("no wallet loaded from {}: {e}", path.display()),
    }

    if cli.unlock {
        let passphrase = read_passphrase("Keystore passphrase: ")?;
        let key = unlock_keystore(&path, &passphrase)
            .with_context(|| format!("failed to unlock {}", path.display()))?;
        builder = builder.unlocked_key(key);
    }

    Ok(builder.build())
}

// ── Command implementations ───────────────────────────────────────────────────

/// `ocq assets`
fn cmd_assets(config: &AcquirerConfig) -> Result<()> {
    let catalog = config.catalog();
    println!("Available datasets:");
    for asset in catalog.assets() {
        println!("  {:<10} {}", asset.key, asset.name);
        println!("             price:  {}", asset.price);
        println!("             format: {}", asset.format);
        println!("             did:    {}", asset.did);
    }
    Ok(())
}

/// `ocq wallet`
fn cmd_wallet(config: &AcquirerConfig) -> Result<()> {
    let path = keystore_path(config);
    let identity = load_identity(&path)
        .with_context(|| format!("failed to read keystore {}", path.display()))?;
    let bytes = std::fs::read(&path)?;
    let sealed = serde_json::from_slice::<KeystoreFile>(&bytes)
        .map(|k| k.crypto.is_some())
        .unwrap_or(false);

    println!("Wallet: {}", path.display());
    println!("  Address: {}", identity.holder_reference());
    println!("  ID:      {}", identity.id());
    println!("  Version: {}", identity.version());
    println!("  Sealed:  {}", if sealed { "yes" } else { "no" });

    if identity.is_well_formed() {
        let balance = config.simulated_ledger().balance(&identity)?;
        println!("  Balance: {} / {}", balance.token, balance.gas);
    } else {
        println!("  Balance: unavailable (keystore has no address)");
    }
    if let Some(network) = &config.network_url {
        println!("  Network: {network}");
    }
    Ok(())
}

/// `ocq init [--force]`
fn cmd_init(config: &AcquirerConfig, force: bool) -> Result<()> {
    let path = keystore_path(config);
    if path.exists() && !force {
        return Err(anyhow!(
            "keystore already exists at {} (use --force to overwrite)",
            path.display()
        ));
    }

    let passphrase = read_passphrase("Enter passphrase for new keystore: ")?;
    if passphrase.is_empty() {
        return Err(anyhow!("passphrase cannot be empty"));
    }
    if std::env::var(PASSWORD_ENV).map_or(true, |v| v.is_empty()) {
        let confirm = read_line("Confirm passphrase: ")?;
        if passphrase != confirm {
            return Err(anyhow!("passphrases do not match"));
        }
    }

    let identity = create_keystore(&path, &passphrase).context("failed to create keystore")?;

    println!("Created keystore");
    println!("  Address: {}", identity.holder_reference());
    println!("  ID:      {}", identity.id());
    println!("  File:    {}", path.display());
    Ok(())
}

/// `ocq acquire <asset>`
fn cmd_acquire(acquirer: &Acquirer, asset_key: &str) -> Result<()> {
    match acquirer.try_acquire(asset_key) {
        Ok(outcome) => {
            print_outcome(&outcome);
            Ok(())
        }
        Err(failure) => Err(failure_error(&failure)),
    }
}

/// `ocq acquire-all`
fn cmd_acquire_all(acquirer: &Acquirer) -> Result<()> {
    let results = acquirer.acquire_all();
    let total = results.len();
    let mut failed = 0;

    for result in &results {
        match result {
            Ok(outcome) => print_outcome(outcome),
            Err(failure) => {
                failed += 1;
                eprintln!("error: {:#}", failure_error(failure));
            }
        }
    }

    println!("Acquired {}/{total} datasets", total - failed);
    if failed > 0 {
        return Err(anyhow!("{failed} acquisition(s) failed"));
    }
    Ok(())
}

/// `ocq records [--json]`
fn cmd_records(config: &AcquirerConfig, json: bool) -> Result<()> {
    let store = config.record_store();
    let records = store
        .list_all()
        .with_context(|| format!("failed to read {}", store.path().display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No purchase records.");
        return Ok(());
    }

    println!("Purchase records ({}):", records.len());
    for (i, record) in records.iter().enumerate() {
        println!(
            "  [{}] {} — {} at {}",
            i + 1,
            record.dataset,
            record.status,
            secs_to_display(record.timestamp)
        );
        println!("      file:   {}", record.file_path);
        println!("      wallet: {}", record.wallet_address);
    }
    Ok(())
}

/// `ocq inspect <asset>`
fn cmd_inspect(config: &AcquirerConfig, asset_key: &str) -> Result<()> {
    let asset = config.catalog().resolve(asset_key)?;
    let client = AquariusClient::new(&config.aquarius_url, config.request_timeout())?;
    let metadata = client
        .fetch_metadata(&asset.did)
        .with_context(|| format!("metadata lookup failed for {asset_key}"))?;

    println!("Dataset: {}", metadata.name);
    println!("  DID:         {}", metadata.did);
    println!("  Type:        {}", metadata.asset_type);
    println!("  Author:      {}", metadata.author);
    println!("  Created:     {}", metadata.created);
    println!("  Services:    {}", metadata.services);
    println!("  Files:       {}", metadata.files);
    if !metadata.description.is_empty() {
        let description: String = metadata.description.chars().take(200).collect();
        println!("  Description: {description}");
    }
    Ok(())
}

/// `ocq summarize <file> [--json]`
fn cmd_summarize(file: &Path, json: bool) -> Result<()> {
    let summary =
        summarize(file).with_context(|| format!("failed to summarize {}", file.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("File: {}", file.display());
    println!("  Size: {} bytes", summary.file_size());
    match summary {
        DatasetSummary::Csv {
            total_lines,
            header,
            sample_lines,
            ..
        } => {
            println!("  Lines:  {total_lines}");
            println!("  Header: {header}");
            for line in sample_lines {
                println!("    {line}");
            }
        }
        DatasetSummary::Json {
            structure,
            keys,
            preview,
            ..
        } => {
            println!("  Structure: {structure}");
            if let Some(keys) = keys {
                println!("  Keys: {}", keys.join(", "));
            }
            println!("  Preview: {preview}");
        }
        DatasetSummary::Unknown { .. } => println!("  Format: unknown"),
    }
    Ok(())
}

/// `ocq menu`
fn cmd_menu(acquirer: &Acquirer) -> Result<()> {
    let assets = acquirer.assets();
    let all = assets.len() + 1;
    let records = assets.len() + 2;
    let exit = assets.len() + 3;

    loop {
        println!();
        println!("Ocean Protocol dataset acquisition");
        for (i, asset) in assets.iter().enumerate() {
            println!("{}. Acquire {}", i + 1, asset.name);
        }
        println!("{all}. Acquire all datasets");
        println!("{records}. View purchase records");
        println!("{exit}. Exit");

        let choice = read_line(&format!("\nYour choice (1-{exit}): "))?;
        match choice.parse::<usize>() {
            Ok(n) if (1..=assets.len()).contains(&n) => {
                if let Err(e) = cmd_acquire(acquirer, &assets[n - 1].key) {
                    eprintln!("error: {e:#}");
                }
            }
            Ok(n) if n == all => {
                if let Err(e) = cmd_acquire_all(acquirer) {
                    eprintln!("error: {e:#}");
                }
            }
            Ok(n) if n == records => {
                let records = acquirer.list_records()?;
                if records.is_empty() {
                    println!("No purchase records.");
                }
                for record in records {
                    println!(
                        "  {} — {} ({})",
                        record.dataset,
                        secs_to_display(record.timestamp),
                        record.status
                    );
                }
            }
            Ok(n) if n == exit => return Ok(()),
            _ => println!("Invalid choice."),
        }
    }
}

// ── Output helpers ────────────────────────────────────────────────────────────

fn print_outcome(outcome: &AcquisitionOutcome) {
    println!("Acquired {}", outcome.asset.name);
    println!("  Paid:        {}", outcome.quote.price);
    println!("  Transaction: {}", outcome.receipt.tx_hash);
    println!("  Token:       {}", outcome.credential.redacted());
    println!("  File:        {}", outcome.file_path.display());
    println!("  At:          {}", secs_to_display(outcome.record.timestamp));
}

fn failure_error(failure: &AcquisitionFailure) -> anyhow::Error {
    let mut message = format!("{}: {failure}", failure.kind());
    if let Some(receipt) = &failure.payment {
        message.push_str(&format!(
            " (payment {} was confirmed and has not been reversed)",
            receipt.tx_hash
        ));
    }
    anyhow!(message)
}
