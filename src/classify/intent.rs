use crate::catalog::{IntentCatalog, IntentEvidence};
use crate::document::Intent;

/// Winning intent with its normalized confidence and matched evidence.
#[derive(Debug, Clone, PartialEq)]
pub struct IntentVerdict {
    pub intent: Intent,
    pub confidence: f64,
    pub matched_evidence: Vec<String>,
}

impl IntentVerdict {
    fn unknown() -> Self {
        Self {
            intent: Intent::Unknown,
            confidence: 0.0,
            matched_evidence: Vec::new(),
        }
    }
}

#[derive(Debug)]
struct CategoryScore {
    raw: u32,
    evidence: Vec<String>,
}

/// Lexical intent scorer over a fixed, ordered catalog.
///
/// Each keyword is tested once by substring containment against the
/// lower-cased text; repetitions in the document do not add weight.
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    catalog: IntentCatalog,
}

impl IntentClassifier {
    pub fn new(catalog: IntentCatalog) -> Self {
        Self { catalog }
    }

    /// Score every category and return the strictly-highest one; equal scores
    /// keep the earlier catalog entry.
    pub fn score(&self, bytes: &[u8]) -> IntentVerdict {
        let text = String::from_utf8_lossy(bytes).to_lowercase();

        let mut best: Option<(&IntentEvidence, CategoryScore)> = None;
        for category in self.catalog.categories() {
            let score = score_category(category, &text);
            let replace = match &best {
                Some((_, current)) => score.raw > current.raw,
                None => score.raw > 0,
            };
            if replace {
                best = Some((category, score));
            }
        }

        let Some((category, score)) = best else {
            return IntentVerdict::unknown();
        };

        let max_possible = category.max_possible_score();
        let confidence = if max_possible == 0 {
            0.0
        } else {
            f64::from(score.raw) / f64::from(max_possible)
        };

        IntentVerdict {
            intent: category.intent,
            confidence,
            matched_evidence: score.evidence,
        }
    }
}

fn score_category(category: &IntentEvidence, text: &str) -> CategoryScore {
    let mut raw = 0;
    let mut evidence = Vec::new();

    let tiers = [
        (&category.high, IntentEvidence::HIGH_WEIGHT),
        (&category.medium, IntentEvidence::MEDIUM_WEIGHT),
        (&category.low, IntentEvidence::LOW_WEIGHT),
    ];
    for (keywords, weight) in tiers {
        for keyword in keywords {
            if text.contains(&keyword.to_lowercase()) {
                raw += weight;
                evidence.push(keyword.clone());
            }
        }
    }

    // Any whitespace-separated word of an example, found anywhere in the text.
    for example in &category.examples {
        let lowered = example.to_lowercase();
        if lowered.split_whitespace().any(|word| text.contains(word)) {
            raw += IntentEvidence::EXAMPLE_BONUS;
            evidence.push(format!("example: {example}"));
        }
    }

    CategoryScore { raw, evidence }
}
