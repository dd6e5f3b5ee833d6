use crate::catalog::PageLexicon;
use crate::document::{Intent, PageContainer};
use crate::extract::{Extract, ExtractionResult, NormalizedFields};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    High,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceFlag {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub severity: Severity,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceDetails {
    pub extracted_fields: BTreeMap<String, f64>,
    pub line_items: Vec<String>,
    pub flags: Vec<InvoiceFlag>,
}

impl InvoiceDetails {
    pub fn total(&self) -> Option<f64> {
        self.extracted_fields.get("total").copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceFlag {
    pub category: String,
    pub matches: Vec<String>,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeySection {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyDetails {
    pub compliance_flags: Vec<ComplianceFlag>,
    pub key_sections: Vec<KeySection>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageKind {
    Invoice(InvoiceDetails),
    Policy(PolicyDetails),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageMetadata {
    pub pages: usize,
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageFields {
    #[serde(flatten)]
    pub kind: PageKind,
    pub metadata: PageMetadata,
}

/// Text extraction for PDF containers, split into an invoice path and a
/// policy/compliance path.
#[derive(Debug, Clone)]
pub struct PageExtractor {
    lexicon: PageLexicon,
}

impl PageExtractor {
    pub fn new(lexicon: PageLexicon) -> Self {
        Self { lexicon }
    }

    fn try_extract(&self, bytes: &[u8]) -> Result<PageFields, String> {
        let container = PageContainer::load(bytes)?;
        let text = container.full_text()?;

        let kind = if self.is_invoice(&text) {
            PageKind::Invoice(self.process_invoice(&text)?)
        } else {
            PageKind::Policy(self.process_policy(&text)?)
        };

        Ok(PageFields {
            kind,
            metadata: PageMetadata {
                pages: container.page_count(),
                size: container.byte_size(),
            },
        })
    }

    pub fn is_invoice(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.lexicon
            .invoice_indicators
            .iter()
            .any(|indicator| lowered.contains(indicator))
    }

    /// Numeric label fields (last successful match per label wins), coarse
    /// line items, and the high-value flag.
    pub fn process_invoice(&self, text: &str) -> Result<InvoiceDetails, String> {
        let lowered = text.to_lowercase();
        let mut extracted_fields = BTreeMap::new();

        for label in self.lexicon.invoice_labels {
            let pattern = Regex::new(&format!(r"{}[:\s]+([\d,.]+)", regex::escape(label)))
                .map_err(|error| format!("invalid pattern for label '{label}': {error}"))?;
            for capture in pattern.captures_iter(&lowered) {
                let digits = capture[1].replace(',', "");
                if let Ok(value) = digits.parse::<f64>() {
                    extracted_fields.insert((*label).to_owned(), value);
                }
            }
        }

        let line_item = Regex::new(r"\d+\s+[\w\s]+\s+[\d,.]+\s+[\d,.]+")
            .map_err(|error| format!("invalid line item pattern: {error}"))?;
        let line_items = text
            .split('\n')
            .filter(|line| line_item.is_match(line))
            .map(|line| line.trim().to_owned())
            .collect();

        let mut flags = Vec::new();
        let total = extracted_fields.get("total").copied().unwrap_or(0.0);
        if total > self.lexicon.high_value_threshold {
            flags.push(InvoiceFlag {
                kind: "high_value".to_owned(),
                message: format!(
                    "Invoice total (${}) exceeds ${}",
                    group_thousands(total, 2),
                    group_thousands(self.lexicon.high_value_threshold, 0)
                ),
                severity: Severity::High,
                amount: total,
            });
        }

        Ok(InvoiceDetails {
            extracted_fields,
            line_items,
            flags,
        })
    }

    /// Compliance keyword hits with surrounding context, plus all-caps
    /// heading sections.
    pub fn process_policy(&self, text: &str) -> Result<PolicyDetails, String> {
        let lowered = text.to_lowercase();
        let mut compliance_flags = Vec::new();

        for category in self.lexicon.compliance {
            let mut matches = Vec::new();
            for keyword in category.keywords {
                if !lowered.contains(keyword) {
                    continue;
                }
                let context = Regex::new(&format!(".{{0,100}}{}.{{0,100}}", regex::escape(keyword)))
                    .map_err(|error| format!("invalid context pattern for '{keyword}': {error}"))?;
                matches.extend(context.find_iter(&lowered).map(|found| found.as_str().to_owned()));
            }

            if !matches.is_empty() {
                compliance_flags.push(ComplianceFlag {
                    category: category.name.to_owned(),
                    matches,
                    severity: if category.high_severity {
                        Severity::High
                    } else {
                        Severity::Medium
                    },
                });
            }
        }

        Ok(PolicyDetails {
            compliance_flags,
            key_sections: key_sections(text)?,
        })
    }
}

impl Extract for PageExtractor {
    fn extract(&self, bytes: &[u8], _intent: Intent) -> ExtractionResult {
        match self.try_extract(bytes) {
            Ok(fields) => {
                let anomalies = match &fields.kind {
                    PageKind::Invoice(invoice) => {
                        invoice.flags.iter().map(|flag| flag.message.clone()).collect()
                    }
                    PageKind::Policy(_) => Vec::new(),
                };
                ExtractionResult::succeeded(NormalizedFields::Page(fields), anomalies, Vec::new())
            }
            Err(error) => {
                tracing::warn!(%error, "page document extraction failed");
                ExtractionResult::failed(error)
            }
        }
    }
}

/// Split text into sections opened by all-caps heading lines; blank lines are
/// dropped from section bodies.
fn key_sections(text: &str) -> Result<Vec<KeySection>, String> {
    let heading = Regex::new(r"^[A-Z\s]{5,}:?$")
        .map_err(|error| format!("invalid heading pattern: {error}"))?;

    let mut sections = Vec::new();
    let mut current: Option<(String, Vec<String>)> = None;

    for line in text.split('\n') {
        let trimmed = line.trim();
        if !trimmed.is_empty() && heading.is_match(line) {
            if let Some((title, body)) = current.take() {
                sections.push(KeySection {
                    title,
                    content: body.join(" "),
                });
            }
            current = Some((trimmed.to_owned(), Vec::new()));
        } else if let Some((_, body)) = current.as_mut()
            && !trimmed.is_empty()
        {
            body.push(trimmed.to_owned());
        }
    }

    if let Some((title, body)) = current {
        sections.push(KeySection {
            title,
            content: body.join(" "),
        });
    }

    Ok(sections)
}

/// `15000.0` with 2 decimals → `15,000.00`.
fn group_thousands(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (whole, fraction) = match fixed.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::new();
    if value < 0.0 {
        grouped.push('-');
    }
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::{PageExtractor, PageKind, Severity, group_thousands, key_sections};
    use crate::catalog::builtin::page_lexicon;
    use crate::document::Intent;
    use crate::document::pdf::tests::pdf_with_lines;
    use crate::extract::{Extract, NormalizedFields, PageFields};

    fn extractor() -> PageExtractor {
        PageExtractor::new(page_lexicon())
    }

    fn page_fields(bytes: &[u8]) -> PageFields {
        let result = extractor().extract(bytes, Intent::Unknown);
        assert!(result.success, "extraction failed: {:?}", result.error);
        match result.normalized_fields {
            Some(NormalizedFields::Page(fields)) => fields,
            other => panic!("expected page fields, got {other:?}"),
        }
    }

    #[test]
    fn high_value_invoice_is_flagged() {
        let bytes = pdf_with_lines(&[&[
            "INVOICE",
            "Invoice Number: 1042",
            "Bill To: Acme Corp",
            "2 Widget assembly 500.00 1,000.00",
            "Subtotal: 14,000.00",
            "Tax: 1,000.00",
            "Total: 15000.00",
        ]]);
        let result = extractor().extract(&bytes, Intent::Invoice);
        assert_eq!(
            result.anomalies,
            vec!["Invoice total ($15,000.00) exceeds $10,000".to_owned()]
        );

        let fields = page_fields(&bytes);
        let PageKind::Invoice(invoice) = &fields.kind else {
            panic!("expected invoice path");
        };
        assert_eq!(invoice.total(), Some(15000.0));
        assert_eq!(invoice.extracted_fields.get("subtotal"), Some(&14000.0));
        assert_eq!(invoice.extracted_fields.get("tax"), Some(&1000.0));
        assert_eq!(invoice.extracted_fields.get("invoice number"), Some(&1042.0));
        assert_eq!(
            invoice.line_items,
            vec!["2 Widget assembly 500.00 1,000.00".to_owned()]
        );
        assert_eq!(invoice.flags.len(), 1);
        assert_eq!(invoice.flags[0].kind, "high_value");
        assert_eq!(invoice.flags[0].amount, 15000.0);
        assert_eq!(invoice.flags[0].severity, Severity::High);
        assert_eq!(fields.metadata.pages, 1);
        assert_eq!(fields.metadata.size, bytes.len());
    }

    #[test]
    fn invoice_serializes_with_type_tag() {
        let bytes = pdf_with_lines(&[&["Invoice", "Total: 200.00"]]);
        let fields = page_fields(&bytes);

        let value = serde_json::to_value(&fields).expect("serialize page fields");
        assert_eq!(value["type"], "invoice");
        assert_eq!(value["extracted_fields"]["total"], 200.0);
        assert_eq!(value["flags"], serde_json::json!([]));
        assert_eq!(value["metadata"]["pages"], 1);
    }

    #[test]
    fn label_scan_keeps_the_last_numeric_match() {
        let invoice = extractor()
            .process_invoice("invoice\ntotal: 10\ntotal: abc\ntotal: 25.5\n")
            .expect("process invoice");

        assert_eq!(invoice.total(), Some(25.5));
        assert!(invoice.flags.is_empty());
    }

    #[test]
    fn non_numeric_label_values_are_skipped() {
        let invoice = extractor()
            .process_invoice("invoice\ntax: ...\n")
            .expect("process invoice");

        assert!(invoice.extracted_fields.get("tax").is_none());
    }

    #[test]
    fn policy_document_collects_compliance_flags_and_sections() {
        let bytes = pdf_with_lines(&[
            &[
                "DATA PROTECTION POLICY",
                "We process personal data under GDPR rules.",
            ],
            &[
                "RETENTION SCHEDULE",
                "Records are kept for medical device audits.",
            ],
        ]);
        let fields = page_fields(&bytes);
        let PageKind::Policy(policy) = &fields.kind else {
            panic!("expected policy path");
        };

        let gdpr = policy
            .compliance_flags
            .iter()
            .find(|flag| flag.category == "gdpr")
            .expect("gdpr flag");
        assert_eq!(gdpr.severity, Severity::High);
        assert_eq!(gdpr.matches.len(), 3);
        assert!(gdpr.matches.iter().all(|m| m == &m.to_lowercase()));

        let fda = policy
            .compliance_flags
            .iter()
            .find(|flag| flag.category == "fda")
            .expect("fda flag");
        assert_eq!(fda.severity, Severity::Medium);
        assert!(!policy.compliance_flags.iter().any(|flag| flag.category == "hipaa"));

        let titles: Vec<&str> = policy
            .key_sections
            .iter()
            .map(|section| section.title.as_str())
            .collect();
        assert_eq!(titles, vec!["DATA PROTECTION POLICY", "RETENTION SCHEDULE"]);
        assert_eq!(
            policy.key_sections[1].content,
            "Records are kept for medical device audits."
        );
        assert_eq!(fields.metadata.pages, 2);
    }

    #[test]
    fn context_is_capped_at_one_hundred_characters_each_side() {
        let padding = "x".repeat(150);
        let text = format!("{padding} hipaa {padding}");
        let policy = extractor().process_policy(&text).expect("process policy");

        let hipaa = &policy.compliance_flags[0];
        assert_eq!(hipaa.category, "hipaa");
        assert_eq!(hipaa.matches[0].len(), 100 + "hipaa".len() + 100);
    }

    #[test]
    fn sections_run_to_end_of_text() {
        let sections = key_sections("preamble\nSCOPE:\nfirst line\n\nsecond line\nTERMS\nlast")
            .expect("sections");

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "SCOPE:");
        assert_eq!(sections[0].content, "first line second line");
        assert_eq!(sections[1].title, "TERMS");
        assert_eq!(sections[1].content, "last");
    }

    #[test]
    fn groups_thousands() {
        assert_eq!(group_thousands(15000.0, 2), "15,000.00");
        assert_eq!(group_thousands(1234567.891, 2), "1,234,567.89");
        assert_eq!(group_thousands(10000.0, 0), "10,000");
        assert_eq!(group_thousands(999.5, 2), "999.50");
    }

    #[test]
    fn unreadable_container_fails_with_message() {
        let result = extractor().extract(b"%PDF-garbage", Intent::Unknown);

        assert!(!result.success);
        assert!(
            result
                .error
                .expect("error message")
                .contains("failed reading pdf container")
        );
    }
}
