use crate::ledger::{ConversationRecord, LedgerError};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

type Records = BTreeMap<String, ConversationRecord>;

/// Keyed, append-only store of conversation records.
///
/// The whole map is held behind one lock and, when file-backed, rewritten as a
/// single JSON document after every mutation. There is no partial-write
/// protocol: a crash mid-write leaves a file that fails to open.
#[derive(Debug)]
pub struct Ledger {
    path: Option<PathBuf>,
    records: Mutex<Records>,
}

impl Ledger {
    /// Open a file-backed ledger; a missing file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        let path = path.into();
        let records = if path.exists() {
            let raw = fs::read_to_string(&path).map_err(|error| {
                LedgerError::Io(format!(
                    "failed to read ledger '{}': {error}",
                    path.display()
                ))
            })?;
            serde_json::from_str(&raw).map_err(|error| {
                LedgerError::Corrupt(format!(
                    "failed to parse ledger '{}': {error}",
                    path.display()
                ))
            })?
        } else {
            Records::new()
        };

        Ok(Self {
            path: Some(path),
            records: Mutex::new(records),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            path: None,
            records: Mutex::new(Records::new()),
        }
    }

    pub fn add_conversation(
        &self,
        id: &str,
        metadata: Value,
    ) -> Result<ConversationRecord, LedgerError> {
        let mut records = self.lock();
        if records.contains_key(id) {
            return Err(LedgerError::DuplicateConversation(id.to_owned()));
        }

        let record = ConversationRecord::new(id, metadata, &now());
        records.insert(id.to_owned(), record.clone());
        self.persist(&records)?;
        Ok(record)
    }

    /// Append one stage output. Appending to an identifier that was never
    /// added is an orchestration bug and is reported, not ignored.
    pub fn update_conversation(&self, id: &str, agent_output: Value) -> Result<(), LedgerError> {
        let mut records = self.lock();
        let record = records
            .get_mut(id)
            .ok_or_else(|| LedgerError::UnknownConversation(id.to_owned()))?;
        record.append(agent_output, &now());
        self.persist(&records)
    }

    pub fn get_conversation(&self, id: &str) -> Option<ConversationRecord> {
        self.lock().get(id).cloned()
    }

    pub fn latest_output(&self, id: &str) -> Option<Value> {
        self.lock()
            .get(id)
            .and_then(|record| record.latest_output().cloned())
    }

    pub fn ids(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    pub fn count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, Records> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, records: &Records) -> Result<(), LedgerError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|error| {
                LedgerError::Io(format!(
                    "failed to create ledger directory '{}': {error}",
                    parent.display()
                ))
            })?;
        }

        let document = serde_json::to_string_pretty(records)
            .map_err(|error| LedgerError::Io(format!("failed to serialize ledger: {error}")))?;
        fs::write(path, document).map_err(|error| {
            LedgerError::Io(format!(
                "failed to write ledger '{}': {error}",
                path.display()
            ))
        })
    }
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Resolve the ledger path from `$DOCFLOW_LEDGER`, then `$HOME/.docflow`.
pub fn ledger_path_from_env<F>(get_env: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = get_env("DOCFLOW_LEDGER")
        && !path.trim().is_empty()
    {
        return path.into();
    }

    if let Some(home) = get_env("HOME")
        && !home.trim().is_empty()
    {
        return PathBuf::from(home).join(".docflow").join("ledger.json");
    }

    PathBuf::from(".docflow/ledger.json")
}
