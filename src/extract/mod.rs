pub mod message;
pub mod page;
pub mod structured;

pub use message::{MessageExtractor, MessageFields, Tone, Urgency};
pub use page::{PageExtractor, PageFields, PageKind};
pub use structured::{StructuredExtractor, StructuredFields};

use crate::catalog::Catalog;
use crate::document::{Format, Intent};
use serde::Serialize;

/// Format-specific extraction capability.
pub trait Extract {
    /// Turn raw bytes into normalized fields for `intent`. Failures are
    /// reported as `success: false` results, never as panics or errors.
    fn extract(&self, bytes: &[u8], intent: Intent) -> ExtractionResult;
}

/// Normalized payload of a successful extraction, one variant per format.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NormalizedFields {
    Structured(StructuredFields),
    Message(MessageFields),
    Page(PageFields),
}

/// Outcome of one extractor run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized_fields: Option<NormalizedFields>,
    pub anomalies: Vec<String>,
    pub missing_required_fields: Vec<String>,
    pub processed_at: String,
}

impl ExtractionResult {
    pub fn succeeded(
        fields: NormalizedFields,
        anomalies: Vec<String>,
        missing_required_fields: Vec<String>,
    ) -> Self {
        Self {
            success: true,
            error: None,
            normalized_fields: Some(fields),
            anomalies,
            missing_required_fields,
            processed_at: now_rfc3339(),
        }
    }

    /// A failed extraction carries its error message and no normalized fields.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            normalized_fields: None,
            anomalies: Vec::new(),
            missing_required_fields: Vec::new(),
            processed_at: now_rfc3339(),
        }
    }
}

/// The closed set of extractors, selected by detected format.
pub struct Extractors {
    structured: StructuredExtractor,
    message: MessageExtractor,
    page: PageExtractor,
}

impl Extractors {
    pub fn new(catalog: &Catalog) -> Self {
        Self {
            structured: StructuredExtractor::new(),
            message: MessageExtractor::new(catalog.message.clone()),
            page: PageExtractor::new(catalog.page.clone()),
        }
    }

    /// Resolve the extractor for a format; `Format::Unknown` has none.
    pub fn for_format(&self, format: Format) -> Option<&dyn Extract> {
        match format {
            Format::StructuredData => Some(&self.structured),
            Format::Message => Some(&self.message),
            Format::PageDocument => Some(&self.page),
            Format::Unknown => None,
        }
    }
}

pub(crate) fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
