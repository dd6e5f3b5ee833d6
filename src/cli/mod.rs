pub mod args;
pub mod exit;

pub use args::{Cli, Command, LedgerAction};
pub use exit::Outcome;
