//! CLI command definitions and argument parsing.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Crosscheck - ask several agents, fact-check the answers, audit the run.
#[derive(Debug, Parser)]
#[command(name = "crosscheck")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(
        short,
        long,
        global = true,
        env = "CROSSCHECK_CONFIG",
        default_value = "crosscheck.toml"
    )]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Ask every configured agent a question and print the session as JSON
    Ask(AskArgs),

    /// Verify the hash chain of the persisted ledger
    VerifyLedger(VerifyLedgerArgs),
}

/// Arguments for the ask command.
#[derive(Debug, Args)]
pub struct AskArgs {
    /// The question to ask
    pub question: String,
}

/// Arguments for the verify-ledger command.
#[derive(Debug, Args)]
pub struct VerifyLedgerArgs {
    /// First block to verify
    #[arg(long, default_value_t = 0)]
    pub from: u64,

    /// Last block to verify (defaults to the tip)
    #[arg(long)]
    pub to: Option<u64>,
}
