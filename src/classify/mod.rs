pub mod intent;

pub use intent::{IntentClassifier, IntentVerdict};

use crate::catalog::IntentCatalog;
use crate::document::{Classification, detect_format};

/// Format detection plus intent scoring for raw document bytes.
#[derive(Debug, Clone)]
pub struct Classifier {
    intents: IntentClassifier,
}

impl Classifier {
    pub fn new(catalog: IntentCatalog) -> Self {
        Self {
            intents: IntentClassifier::new(catalog),
        }
    }

    /// Classify a document. Pure function of the bytes: no clock, no randomness.
    pub fn classify(&self, bytes: &[u8]) -> Classification {
        let format = detect_format(bytes);
        let verdict = self.intents.score(bytes);
        Classification {
            format,
            intent: verdict.intent,
            confidence: verdict.confidence,
            matched_evidence: verdict.matched_evidence,
        }
    }
}
