#![forbid(unsafe_code)]

pub mod catalog;
pub mod classify;
pub mod cli;
pub mod config;
pub mod document;
pub mod extract;
pub mod ledger;
pub mod output;
pub mod pipeline;
pub mod refusal;
pub mod route;

pub use catalog::Catalog;
pub use document::{Classification, Format, Intent};
pub use extract::{ExtractionResult, NormalizedFields};
pub use ledger::{ConversationRecord, Ledger, LedgerError};
pub use pipeline::{Pipeline, ProcessResponse};
pub use refusal::{RefusalCode, RefusalEnvelope};
pub use route::{Action, ActionStatus, Service, ServiceRegistry};

use cli::Outcome;
use std::path::Path;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Run the docflow CLI. Returns an exit code (0, 1, or 2).
pub fn run() -> u8 {
    use clap::Parser;
    use cli::{Cli, Command};

    let cli = Cli::parse();

    if cli.describe {
        return handle_describe();
    }

    let Some(command) = cli.command else {
        eprintln!("Error: a subcommand is required (process, classify, record, ledger)");
        return Outcome::Refusal.exit_code();
    };

    let settings = match config::Settings::load(cli.ledger.as_deref(), cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(error) => {
            eprintln!("Error: {error}");
            return Outcome::Refusal.exit_code();
        }
    };

    let outcome = match command {
        Command::Process { file, content_type } => {
            handle_process(settings, &file, content_type.as_deref())
        }
        Command::Classify { file } => handle_classify(settings, &file),
        Command::Record { id } => handle_record(&settings, &id),
        Command::Ledger { action } => handle_ledger(&settings, action),
    };
    outcome.exit_code()
}

/// Handle --describe flag: print operator.json and exit.
fn handle_describe() -> u8 {
    let operator = serde_json::json!({
        "name": "docflow",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Classify documents, extract structured fields and route follow-up actions",
        "author": "CMD+RVL",
        "pipeline_role": "ingestor",
        "input_formats": ["structured_data", "message", "page_document"],
        "output_format": "JSON",
        "stdin_support": false,
        "file_support": true,
        "ledger_env": "DOCFLOW_LEDGER",
        "config_env": config::CONFIG_ENV
    });

    match emit(&operator) {
        Ok(()) => Outcome::Success.exit_code(),
        Err(error) => {
            eprintln!("Error: {error}");
            Outcome::Refusal.exit_code()
        }
    }
}

fn handle_process(settings: config::Settings, file: &Path, content_type: Option<&str>) -> Outcome {
    let bytes = match read_document(file) {
        Ok(bytes) => bytes,
        Err(error) => {
            eprintln!("Error: {error}");
            return Outcome::Refusal;
        }
    };

    let pipeline = match Pipeline::from_settings(settings) {
        Ok(pipeline) => pipeline,
        Err(error) => {
            let refusal = RefusalEnvelope::new(
                RefusalCode::Ledger,
                "Ledger could not be opened",
                serde_json::json!({ "error": error.to_string() }),
                None,
            );
            return emit_refusal(&refusal);
        }
    };

    let filename = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());

    match pipeline.process(
        &bytes,
        &filename,
        content_type.unwrap_or(DEFAULT_CONTENT_TYPE),
    ) {
        Ok(response) => {
            if let Err(error) = emit(&response) {
                eprintln!("Error: {error}");
                return Outcome::Refusal;
            }
            let clean = response.extraction_result.success
                && response
                    .actions
                    .iter()
                    .all(|action| action.status == ActionStatus::Success);
            if clean {
                Outcome::Success
            } else {
                Outcome::Partial
            }
        }
        Err(refusal) => emit_refusal(&refusal),
    }
}

fn handle_classify(settings: config::Settings, file: &Path) -> Outcome {
    let bytes = match read_document(file) {
        Ok(bytes) => bytes,
        Err(error) => {
            eprintln!("Error: {error}");
            return Outcome::Refusal;
        }
    };

    let classification = classify::Classifier::new(settings.catalog.intents).classify(&bytes);
    match emit(&classification) {
        Ok(()) => Outcome::Success,
        Err(error) => {
            eprintln!("Error: {error}");
            Outcome::Refusal
        }
    }
}

fn handle_record(settings: &config::Settings, id: &str) -> Outcome {
    let ledger = match Ledger::open(&settings.ledger_path) {
        Ok(ledger) => ledger,
        Err(error) => {
            eprintln!("Error querying ledger: {error}");
            return Outcome::Refusal;
        }
    };

    match ledger.get_conversation(id) {
        Some(record) => match emit(&record) {
            Ok(()) => Outcome::Success,
            Err(error) => {
                eprintln!("Error: {error}");
                Outcome::Refusal
            }
        },
        None => {
            eprintln!("No record found for '{id}'");
            Outcome::Partial
        }
    }
}

fn handle_ledger(settings: &config::Settings, action: cli::LedgerAction) -> Outcome {
    let ledger = match Ledger::open(&settings.ledger_path) {
        Ok(ledger) => ledger,
        Err(error) => {
            eprintln!("Error querying ledger: {error}");
            return Outcome::Refusal;
        }
    };

    match action {
        cli::LedgerAction::List => {
            let summaries: Vec<serde_json::Value> = ledger
                .ids()
                .into_iter()
                .filter_map(|id| ledger.get_conversation(&id))
                .map(|record| {
                    serde_json::json!({
                        "id": record.id,
                        "filename": record.metadata.get("filename"),
                        "created_at": record.created_at,
                        "stages": record.history.len(),
                    })
                })
                .collect();
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            match output::write_jsonl(&mut out, &summaries) {
                Ok(()) => Outcome::Success,
                Err(error) => {
                    eprintln!("Error: {error}");
                    Outcome::Refusal
                }
            }
        }
        cli::LedgerAction::Count => {
            println!("{}", ledger.count());
            Outcome::Success
        }
    }
}

fn read_document(path: &Path) -> Result<Vec<u8>, String> {
    std::fs::read(path)
        .map_err(|error| format!("failed to read document '{}': {error}", path.display()))
}

fn emit<T: serde::Serialize>(document: &T) -> Result<(), String> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    output::write_json(&mut out, document)
}

fn emit_refusal(refusal: &RefusalEnvelope) -> Outcome {
    if let Err(error) = emit(refusal) {
        eprintln!("Error: {error}");
    }
    Outcome::Refusal
}
