//! Crosscheck command-line interface

mod cli;

use anyhow::Context;
use clap::Parser;
use cli::{AskArgs, Cli, Command, VerifyLedgerArgs};
use crosscheck_dispatch::CancellationToken;
use crosscheck_ledger::{Ledger, LedgerError, SqliteLedgerStore};
use crosscheck_pipeline::{Orchestrator, PipelineConfig, StorageConfig};
use crosscheck_store::SqliteSessionStore;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Exit status when a session ends in error or the ledger fails verification
const EXIT_FAILED: i32 = 2;

#[tokio::main]
async fn main() {
    // Logs go to stderr; stdout carries only JSON
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run().await {
        Ok(true) => {}
        Ok(false) => std::process::exit(EXIT_FAILED),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

async fn run() -> anyhow::Result<bool> {
    let cli = Cli::parse();
    let config = PipelineConfig::from_file(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    match cli.command {
        Command::Ask(args) => ask(&config, args).await,
        Command::VerifyLedger(args) => verify_ledger(&config, args),
    }
}

async fn ask(config: &PipelineConfig, args: AskArgs) -> anyhow::Result<bool> {
    let ledger = Arc::new(Ledger::new(open_ledger(&config.ledger)?));
    let store = match &config.store.path {
        Some(path) => SqliteSessionStore::open(path)
            .with_context(|| format!("opening session store {}", path.display()))?,
        None => SqliteSessionStore::in_memory()?,
    };
    let orchestrator = Orchestrator::from_config(config, ledger, store)?;

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling session");
            interrupt.cancel();
        }
    });

    let outcome = orchestrator.run_with_cancel(&args.question, &cancel).await;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(outcome.succeeded())
}

fn verify_ledger(config: &PipelineConfig, args: VerifyLedgerArgs) -> anyhow::Result<bool> {
    let path = config
        .ledger
        .path
        .as_deref()
        .context("[ledger] path must be set to verify a persisted ledger")?;
    let ledger = Ledger::new(open_sqlite_ledger(path)?);

    let blocks = ledger.len()?;
    let to = args.to.unwrap_or(blocks.saturating_sub(1));
    let result = ledger.verify_chain_detailed(args.from, to);
    let first_bad_block = match &result {
        Err(LedgerError::HashMismatch { block_number }) => Some(*block_number),
        _ => None,
    };
    info!(blocks, from = args.from, to, valid = result.is_ok(), "Ledger checked");

    let report = json!({
        "blocks": blocks,
        "from": args.from,
        "to": to,
        "valid": result.is_ok(),
        "first_bad_block": first_bad_block,
        "error": result.as_ref().err().map(|e| e.to_string()),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(result.is_ok())
}

fn open_ledger(storage: &StorageConfig) -> anyhow::Result<SqliteLedgerStore> {
    match &storage.path {
        Some(path) => open_sqlite_ledger(path),
        None => Ok(SqliteLedgerStore::in_memory()?),
    }
}

fn open_sqlite_ledger(path: &Path) -> anyhow::Result<SqliteLedgerStore> {
    SqliteLedgerStore::open(path).with_context(|| format!("opening ledger {}", path.display()))
}
