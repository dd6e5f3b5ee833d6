use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One appended stage output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: String,
    pub agent_output: Value,
}

/// Full processing history of one submitted document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub id: String,
    pub metadata: Value,
    pub history: Vec<HistoryEntry>,
    pub created_at: String,
    pub last_updated: String,
}

impl ConversationRecord {
    pub fn new(id: impl Into<String>, metadata: Value, now: &str) -> Self {
        Self {
            id: id.into(),
            metadata,
            history: Vec::new(),
            created_at: now.to_owned(),
            last_updated: now.to_owned(),
        }
    }

    pub fn append(&mut self, agent_output: Value, now: &str) {
        self.history.push(HistoryEntry {
            timestamp: now.to_owned(),
            agent_output,
        });
        self.last_updated = now.to_owned();
    }

    pub fn latest_output(&self) -> Option<&Value> {
        self.history.last().map(|entry| &entry.agent_output)
    }

    /// First history entry whose output is keyed by `stage`, e.g. `"extraction"`.
    pub fn stage_output(&self, stage: &str) -> Option<&Value> {
        self.history
            .iter()
            .find_map(|entry| entry.agent_output.get(stage))
    }
}
