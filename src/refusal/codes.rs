use serde::{Deserialize, Serialize};
use std::fmt;

/// Run-level refusal codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefusalCode {
    /// No format detector matched the submitted bytes.
    #[serde(rename = "E_UNSUPPORTED_FORMAT")]
    UnsupportedFormat,
    /// The action router could not resolve or build an action.
    #[serde(rename = "E_ROUTING_FAILED")]
    RoutingFailed,
    /// The ledger rejected a write or could not be persisted.
    #[serde(rename = "E_LEDGER")]
    Ledger,
}

impl RefusalCode {
    pub fn as_str(self) -> &'static str {
        match self {
            RefusalCode::UnsupportedFormat => "E_UNSUPPORTED_FORMAT",
            RefusalCode::RoutingFailed => "E_ROUTING_FAILED",
            RefusalCode::Ledger => "E_LEDGER",
        }
    }
}

impl fmt::Display for RefusalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
