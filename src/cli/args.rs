use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "docflow", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Ledger file (default: $DOCFLOW_LEDGER or ~/.docflow/ledger.json)
    #[arg(long, global = true, value_name = "PATH")]
    pub ledger: Option<PathBuf>,

    /// YAML config with service endpoints and intent catalog (default: $DOCFLOW_CONFIG)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print operator.json and exit
    #[arg(long)]
    pub describe: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the full pipeline on one document and record it in the ledger
    Process {
        /// Document to process
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Declared content type (default: application/octet-stream)
        #[arg(long, value_name = "TYPE")]
        content_type: Option<String>,
    },
    /// Classify a document without recording it
    Classify {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Print the ledger record for a conversation
    Record {
        #[arg(value_name = "ID")]
        id: String,
    },
    /// Query the ledger
    Ledger {
        #[command(subcommand)]
        action: LedgerAction,
    },
}

#[derive(Subcommand)]
pub enum LedgerAction {
    /// List conversation ids
    List,
    /// Count conversation records
    Count,
}
