use crate::refusal::codes::RefusalCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub const ENVELOPE_VERSION: &str = "docflow.v0";

/// Refusal envelope emitted to stdout on exit 2 and recorded as the run outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefusalEnvelope {
    pub version: String,
    pub outcome: String,
    pub refusal: RefusalBody,
}

/// Detail within a refusal envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefusalBody {
    pub code: RefusalCode,
    pub message: String,
    pub detail: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    pub timestamp: String,
}

impl RefusalEnvelope {
    pub fn new(
        code: RefusalCode,
        message: impl Into<String>,
        detail: Value,
        conversation_id: Option<&str>,
    ) -> Self {
        Self {
            version: ENVELOPE_VERSION.to_owned(),
            outcome: "REFUSAL".to_owned(),
            refusal: RefusalBody {
                code,
                message: message.into(),
                detail,
                conversation_id: conversation_id.map(str::to_owned),
                timestamp: chrono::Utc::now().to_rfc3339(),
            },
        }
    }

    pub fn code(&self) -> RefusalCode {
        self.refusal.code
    }
}

impl fmt::Display for RefusalEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.refusal.code, self.refusal.message)
    }
}

impl std::error::Error for RefusalEnvelope {}
