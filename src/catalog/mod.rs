pub mod builtin;

use crate::document::Intent;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Keyword evidence for one intent category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentEvidence {
    pub intent: Intent,
    #[serde(default)]
    pub high: Vec<String>,
    #[serde(default)]
    pub medium: Vec<String>,
    #[serde(default)]
    pub low: Vec<String>,
    #[serde(default)]
    pub examples: Vec<String>,
}

impl IntentEvidence {
    pub const HIGH_WEIGHT: u32 = 3;
    pub const MEDIUM_WEIGHT: u32 = 2;
    pub const LOW_WEIGHT: u32 = 1;
    pub const EXAMPLE_BONUS: u32 = 2;

    /// Best score a document can reach for this category.
    pub fn max_possible_score(&self) -> u32 {
        Self::HIGH_WEIGHT * self.high.len() as u32
            + Self::MEDIUM_WEIGHT * self.medium.len() as u32
            + Self::LOW_WEIGHT * self.low.len() as u32
            + Self::EXAMPLE_BONUS * self.examples.len() as u32
    }
}

/// Ordered intent catalog. Order is significant: equal scores resolve to the
/// first-listed category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct IntentCatalog {
    categories: Vec<IntentEvidence>,
}

impl IntentCatalog {
    /// Build a catalog, rejecting empty, duplicate, or `unknown` categories and
    /// blank keywords (a blank keyword is contained in every text).
    pub fn new(categories: Vec<IntentEvidence>) -> Result<Self, String> {
        if categories.is_empty() {
            return Err("intent catalog must contain at least one category".to_owned());
        }

        let mut seen = BTreeSet::new();
        for category in &categories {
            if category.intent == Intent::Unknown {
                return Err("intent catalog cannot score the 'unknown' intent".to_owned());
            }
            if !seen.insert(category.intent) {
                return Err(format!(
                    "duplicate intent category '{}' in catalog",
                    category.intent
                ));
            }
            let blank = [&category.high, &category.medium, &category.low, &category.examples]
                .into_iter()
                .flatten()
                .any(|entry| entry.trim().is_empty());
            if blank {
                return Err(format!(
                    "intent category '{}' has a blank keyword or example",
                    category.intent
                ));
            }
            if category.max_possible_score() == 0 {
                return Err(format!(
                    "intent category '{}' has no keywords or examples",
                    category.intent
                ));
            }
        }

        Ok(Self { categories })
    }

    pub fn categories(&self) -> &[IntentEvidence] {
        &self.categories
    }

    /// Load a catalog override from a YAML sequence of categories.
    pub fn from_yaml_file(path: &Path) -> Result<Self, String> {
        let raw = std::fs::read_to_string(path).map_err(|error| {
            format!("failed to read intent catalog '{}': {error}", path.display())
        })?;
        Self::from_yaml_str(&raw)
            .map_err(|error| format!("invalid intent catalog '{}': {error}", path.display()))
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, String> {
        let categories: Vec<IntentEvidence> =
            serde_yaml::from_str(raw).map_err(|error| error.to_string())?;
        Self::new(categories)
    }
}

/// Keyword tables used by the message extractor. Every table is scanned
/// first-match in declaration order.
#[derive(Debug, Clone)]
pub struct MessageLexicon {
    pub urgency_high: &'static [&'static str],
    pub urgency_medium: &'static [&'static str],
    pub urgency_low: &'static [&'static str],
    pub intent_rules: &'static [(Intent, &'static [&'static str])],
    pub tone_threatening: &'static [&'static str],
    pub tone_angry: &'static [&'static str],
    pub key_point_markers: &'static [&'static str],
    pub action_item_markers: &'static [&'static str],
}

/// Regulatory category with the keywords that signal it.
#[derive(Debug, Clone, Copy)]
pub struct ComplianceCategory {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    pub high_severity: bool,
}

/// Page-document vocabulary: invoice indicators, field labels and the
/// compliance registry used on the policy path.
#[derive(Debug, Clone)]
pub struct PageLexicon {
    pub invoice_indicators: &'static [&'static str],
    pub invoice_labels: &'static [&'static str],
    pub high_value_threshold: f64,
    pub compliance: &'static [ComplianceCategory],
}

/// All keyword registries, built once at startup and handed to components.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub intents: IntentCatalog,
    pub message: MessageLexicon,
    pub page: PageLexicon,
}

impl Catalog {
    pub fn builtin() -> Self {
        Self {
            intents: builtin::intent_catalog(),
            message: builtin::message_lexicon(),
            page: builtin::page_lexicon(),
        }
    }

    pub fn with_intents(mut self, intents: IntentCatalog) -> Self {
        self.intents = intents;
        self
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
