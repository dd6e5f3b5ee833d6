use crate::catalog::Catalog;
use crate::classify::Classifier;
use crate::config::Settings;
use crate::document::{Classification, Format};
use crate::extract::{ExtractionResult, Extractors};
use crate::ledger::{ConversationRecord, Ledger, LedgerError};
use crate::refusal::{RefusalCode, RefusalEnvelope};
use crate::route::{Action, ActionRouter, ServiceRegistry};
use serde::Serialize;
use serde_json::{Value, json};

/// Assembled result of one successful pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessResponse {
    pub conversation_id: String,
    pub classification: Classification,
    pub extraction_result: ExtractionResult,
    pub actions: Vec<Action>,
}

/// Sequences classification, extraction and routing for one document,
/// recording every stage in the ledger.
pub struct Pipeline {
    classifier: Classifier,
    extractors: Extractors,
    router: ActionRouter,
    ledger: Ledger,
}

impl Pipeline {
    pub fn new(catalog: Catalog, registry: ServiceRegistry, ledger: Ledger) -> Self {
        let router = ActionRouter::new(registry, catalog.page.high_value_threshold);
        Self {
            classifier: Classifier::new(catalog.intents.clone()),
            extractors: Extractors::new(&catalog),
            router,
            ledger,
        }
    }

    /// Open the configured ledger file and build the pipeline around it.
    pub fn from_settings(settings: Settings) -> Result<Self, LedgerError> {
        let ledger = Ledger::open(&settings.ledger_path)?;
        Ok(Self::new(settings.catalog, settings.registry, ledger))
    }

    pub fn with_router(mut self, router: ActionRouter) -> Self {
        self.router = router;
        self
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn classify(&self, bytes: &[u8]) -> Classification {
        self.classifier.classify(bytes)
    }

    /// Run the full pipeline once.
    ///
    /// The ledger holds a record for the returned identifier before this
    /// returns, including on refusal once the record has been created.
    #[allow(clippy::result_large_err)]
    pub fn process(
        &self,
        bytes: &[u8],
        filename: &str,
        content_type: &str,
    ) -> Result<ProcessResponse, RefusalEnvelope> {
        let conversation_id = uuid::Uuid::new_v4().to_string();
        let metadata = json!({
            "filename": filename,
            "content_type": content_type,
            "size": bytes.len(),
            "uploaded_at": chrono::Utc::now().to_rfc3339(),
            "bytes_hash": format!("blake3:{}", blake3::hash(bytes).to_hex()),
        });
        self.ledger
            .add_conversation(&conversation_id, metadata)
            .map_err(|error| ledger_refusal(&error, None))?;

        let classification = self.classifier.classify(bytes);
        tracing::info!(
            conversation_id = %conversation_id,
            format = %classification.format,
            intent = %classification.intent,
            confidence = classification.confidence,
            "document classified"
        );
        self.record(&conversation_id, "classification", &classification)?;

        let Some(extractor) = self.extractors.for_format(classification.format) else {
            let refusal = RefusalEnvelope::new(
                RefusalCode::UnsupportedFormat,
                "Unsupported document format",
                json!({
                    "format": Format::Unknown,
                    "filename": filename,
                    "content_type": content_type,
                    "size": bytes.len(),
                }),
                Some(&conversation_id),
            );
            return Err(self.refuse(&conversation_id, refusal));
        };

        let extraction = extractor.extract(bytes, classification.intent);
        tracing::info!(
            conversation_id = %conversation_id,
            success = extraction.success,
            anomalies = extraction.anomalies.len(),
            missing = extraction.missing_required_fields.len(),
            "extraction finished"
        );
        self.record(&conversation_id, "extraction", &extraction)?;

        let routing = self.router.route(&extraction, &classification);
        self.record(&conversation_id, "actions", &routing)?;

        if !routing.success {
            let refusal = RefusalEnvelope::new(
                RefusalCode::RoutingFailed,
                "Action routing failed",
                json!({ "error": routing.error }),
                Some(&conversation_id),
            );
            return Err(self.refuse(&conversation_id, refusal));
        }

        tracing::info!(
            conversation_id = %conversation_id,
            actions = routing.actions.len(),
            "document processed"
        );
        self.record(&conversation_id, "outcome", &"completed")?;

        Ok(ProcessResponse {
            conversation_id,
            classification,
            extraction_result: extraction,
            actions: routing.actions,
        })
    }

    pub fn get_record(&self, conversation_id: &str) -> Option<ConversationRecord> {
        self.ledger.get_conversation(conversation_id)
    }

    #[allow(clippy::result_large_err)]
    fn record<T: Serialize>(
        &self,
        conversation_id: &str,
        stage: &str,
        output: &T,
    ) -> Result<(), RefusalEnvelope> {
        let output = serde_json::to_value(output).map_err(|error| {
            ledger_refusal(
                &LedgerError::Io(format!("failed to serialize {stage} output: {error}")),
                Some(conversation_id),
            )
        })?;
        let mut entry = serde_json::Map::new();
        entry.insert(stage.to_owned(), output);

        self.ledger
            .update_conversation(conversation_id, Value::Object(entry))
            .map_err(|error| ledger_refusal(&error, Some(conversation_id)))
    }

    /// Record the refusal as the run outcome and hand it back. A ledger
    /// failure while recording takes precedence.
    fn refuse(&self, conversation_id: &str, refusal: RefusalEnvelope) -> RefusalEnvelope {
        tracing::warn!(
            conversation_id = %conversation_id,
            code = %refusal.code(),
            message = %refusal.refusal.message,
            "document refused"
        );
        match self.record(conversation_id, "outcome", &refusal) {
            Ok(()) => refusal,
            Err(ledger_failure) => ledger_failure,
        }
    }
}

fn ledger_refusal(error: &LedgerError, conversation_id: Option<&str>) -> RefusalEnvelope {
    RefusalEnvelope::new(
        RefusalCode::Ledger,
        "Ledger write failed",
        json!({ "error": error.to_string() }),
        conversation_id,
    )
}
