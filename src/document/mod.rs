pub mod detect;
pub mod pdf;

pub use detect::detect_format;
pub use pdf::PageContainer;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Structural encoding of a submitted document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    StructuredData,
    Message,
    PageDocument,
    Unknown,
}

impl Format {
    pub fn as_str(self) -> &'static str {
        match self {
            Format::StructuredData => "structured_data",
            Format::Message => "message",
            Format::PageDocument => "page_document",
            Format::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inferred business purpose of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Invoice,
    Rfq,
    Complaint,
    Regulation,
    FraudRisk,
    General,
    Unknown,
}

impl Intent {
    pub fn as_str(self) -> &'static str {
        match self {
            Intent::Invoice => "invoice",
            Intent::Rfq => "rfq",
            Intent::Complaint => "complaint",
            Intent::Regulation => "regulation",
            Intent::FraudRisk => "fraud_risk",
            Intent::General => "general",
            Intent::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Format and intent verdict for one document. Never mutated once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub format: Format,
    pub intent: Intent,
    pub confidence: f64,
    pub matched_evidence: Vec<String>,
}
