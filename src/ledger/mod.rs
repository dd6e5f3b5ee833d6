pub mod record;
pub mod store;

pub use record::{ConversationRecord, HistoryEntry};
pub use store::{Ledger, ledger_path_from_env};

use std::fmt;

/// Ledger consistency and persistence failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// An append targeted an identifier that was never added.
    UnknownConversation(String),
    /// `add_conversation` was called twice for one identifier.
    DuplicateConversation(String),
    /// Reading or writing the backing file failed.
    Io(String),
    /// The backing file is not a valid ledger document.
    Corrupt(String),
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::UnknownConversation(id) => write!(f, "conversation '{id}' not found"),
            LedgerError::DuplicateConversation(id) => {
                write!(f, "conversation '{id}' already exists")
            }
            LedgerError::Io(error) | LedgerError::Corrupt(error) => f.write_str(error),
        }
    }
}

impl std::error::Error for LedgerError {}
