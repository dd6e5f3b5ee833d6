use crate::catalog::{
    ComplianceCategory, IntentCatalog, IntentEvidence, MessageLexicon, PageLexicon,
};
use crate::document::Intent;

fn category(
    intent: Intent,
    high: &[&str],
    medium: &[&str],
    low: &[&str],
    examples: &[&str],
) -> IntentEvidence {
    let owned = |words: &[&str]| words.iter().map(|word| (*word).to_owned()).collect();
    IntentEvidence {
        intent,
        high: owned(high),
        medium: owned(medium),
        low: owned(low),
        examples: owned(examples),
    }
}

/// Built-in intent catalog (invoice, rfq, complaint, regulation, fraud_risk, general).
pub fn intent_catalog() -> IntentCatalog {
    IntentCatalog {
        categories: vec![
            category(
                Intent::Invoice,
                &["invoice", "bill to", "amount due", "payment due"],
                &["payment", "due date", "subtotal", "remit"],
                &["amount", "due", "bill", "total"],
                &[
                    "invoice attached for services rendered",
                    "remit payment before the due date",
                ],
            ),
            category(
                Intent::Rfq,
                &["rfq", "request for quote", "quotation", "quote"],
                &["pricing", "proposal", "bid", "tender"],
                &["quantity", "delivery", "specification"],
                &[
                    "requesting pricing quotation for components",
                    "submit your proposal with lead times",
                ],
            ),
            category(
                Intent::Complaint,
                &["complaint", "dissatisfied", "unacceptable"],
                &["issue", "problem", "unhappy", "refund"],
                &["broken", "delay", "disappointed"],
                &[
                    "filing a formal complaint about your service",
                    "product arrived damaged and support never replied",
                ],
            ),
            category(
                Intent::Regulation,
                &["regulation", "compliance", "gdpr", "hipaa"],
                &["policy", "requirement", "law", "directive"],
                &["audit", "standard", "mandatory"],
                &[
                    "ensure compliance with applicable regulations",
                    "policy requirements become effective immediately",
                ],
            ),
            category(
                Intent::FraudRisk,
                &["fraud", "suspicious transaction", "unauthorized"],
                &["chargeback", "phishing", "identity theft", "money laundering"],
                &["suspicious", "risk", "alert"],
                &[
                    "report suspicious account activity",
                    "unauthorized transfer detected overnight",
                ],
            ),
            category(
                Intent::General,
                &[],
                &["inquiry", "information"],
                &["hello", "update", "meeting", "thanks"],
                &["general question regarding our account"],
            ),
        ],
    }
}

const URGENCY_HIGH: &[&str] = &["urgent", "asap", "emergency", "critical", "immediate"];
const URGENCY_MEDIUM: &[&str] = &["important", "priority", "attention", "needed"];
const URGENCY_LOW: &[&str] = &["when possible", "fyi", "update"];

const MESSAGE_INTENTS: &[(Intent, &[&str])] = &[
    (Intent::Rfq, &["quote", "pricing", "cost"]),
    (Intent::Complaint, &["complaint", "issue", "problem"]),
    (Intent::Invoice, &["invoice", "payment", "bill"]),
    (Intent::Regulation, &["regulation", "compliance", "policy"]),
];

const TONE_THREATENING: &[&str] = &[
    "legal action",
    "lawsuit",
    "my lawyer",
    "attorney",
    "or else",
];
const TONE_ANGRY: &[&str] = &[
    "unacceptable",
    "furious",
    "outraged",
    "angry",
    "ridiculous",
    "fed up",
];

const KEY_POINT_MARKERS: &[&str] = &["important", "key", "must", "need", "require", "critical"];
const ACTION_ITEM_MARKERS: &[&str] = &[
    "please",
    "could you",
    "need to",
    "action required",
    "todo",
];

pub fn message_lexicon() -> MessageLexicon {
    MessageLexicon {
        urgency_high: URGENCY_HIGH,
        urgency_medium: URGENCY_MEDIUM,
        urgency_low: URGENCY_LOW,
        intent_rules: MESSAGE_INTENTS,
        tone_threatening: TONE_THREATENING,
        tone_angry: TONE_ANGRY,
        key_point_markers: KEY_POINT_MARKERS,
        action_item_markers: ACTION_ITEM_MARKERS,
    }
}

const INVOICE_INDICATORS: &[&str] = &["invoice", "bill to", "payment due", "total amount"];
const INVOICE_LABELS: &[&str] = &["invoice number", "date", "due date", "total", "subtotal", "tax"];

const COMPLIANCE: &[ComplianceCategory] = &[
    ComplianceCategory {
        name: "gdpr",
        keywords: &["gdpr", "data protection", "privacy", "personal data"],
        high_severity: true,
    },
    ComplianceCategory {
        name: "fda",
        keywords: &["fda", "food and drug", "medical device", "pharmaceutical"],
        high_severity: false,
    },
    ComplianceCategory {
        name: "hipaa",
        keywords: &["hipaa", "health insurance", "medical privacy"],
        high_severity: true,
    },
    ComplianceCategory {
        name: "pci",
        keywords: &["pci dss", "payment card", "credit card security"],
        high_severity: false,
    },
];

pub fn page_lexicon() -> PageLexicon {
    PageLexicon {
        invoice_indicators: INVOICE_INDICATORS,
        invoice_labels: INVOICE_LABELS,
        high_value_threshold: 10_000.0,
        compliance: COMPLIANCE,
    }
}
