mod common;

use common::{NEGATIVE_INVOICE, URGENT_MESSAGE, pdf_with_lines};
use docflow::config::Settings;
use docflow::extract::{NormalizedFields, PageKind, Urgency};
use docflow::{
    Catalog, Classification, Format, Intent, Ledger, Pipeline, RefusalCode, Service,
    ServiceRegistry,
};
use serde_json::json;
use std::path::Path;

fn file_pipeline(path: &Path) -> Pipeline {
    Pipeline::new(
        Catalog::builtin(),
        ServiceRegistry::default(),
        Ledger::open(path).expect("open ledger"),
    )
}

#[test]
fn negative_invoice_amount_is_flagged_and_reported() {
    let tempdir = tempfile::tempdir().expect("create temp dir");
    let pipeline = file_pipeline(&tempdir.path().join("ledger.json"));

    let response = pipeline
        .process(NEGATIVE_INVOICE, "invoice.json", "application/json")
        .expect("process invoice");

    assert_eq!(response.classification.format, Format::StructuredData);
    assert_eq!(response.classification.intent, Intent::Invoice);
    let extraction = &response.extraction_result;
    assert!(extraction.success);
    assert_eq!(extraction.anomalies, vec!["Negative amount detected".to_owned()]);
    assert!(extraction.missing_required_fields.is_empty());

    let value = serde_json::to_value(extraction).expect("serialize extraction");
    assert_eq!(value["normalized_fields"]["content"]["currency"], "USD");
    assert_eq!(value["normalized_fields"]["metadata"]["source"], "structured_data");

    assert_eq!(response.actions.len(), 1);
    assert_eq!(response.actions[0].service, Service::Risk);
    assert_eq!(response.actions[0].payload["source_data"]["invoice_number"], "INV-1");
}

#[test]
fn missing_invoice_number_is_listed_once() {
    let pipeline = Pipeline::new(
        Catalog::builtin(),
        ServiceRegistry::default(),
        Ledger::in_memory(),
    );
    let response = pipeline
        .process(
            br#"{"invoice": true, "amount": 10, "due_date": "2025-02-01"}"#,
            "invoice.json",
            "application/json",
        )
        .expect("process invoice");

    let missing = &response.extraction_result.missing_required_fields;
    assert_eq!(
        missing.iter().filter(|field| *field == "invoice_number").count(),
        1
    );
    assert_eq!(response.actions[0].action_name, "validation_error");
}

#[test]
fn urgent_message_resolves_high_urgency_and_action_items() {
    let pipeline = Pipeline::new(
        Catalog::builtin(),
        ServiceRegistry::default(),
        Ledger::in_memory(),
    );
    let response = pipeline
        .process(URGENT_MESSAGE.as_bytes(), "review.eml", "message/rfc822")
        .expect("process message");

    assert_eq!(response.classification.format, Format::Message);
    let Some(NormalizedFields::Message(message)) = &response.extraction_result.normalized_fields
    else {
        panic!("expected message fields");
    };
    assert_eq!(message.metadata.urgency, Urgency::High);
    assert_eq!(message.metadata.sender.email, "a@b.com");
    assert!(
        message
            .content
            .action_items
            .iter()
            .any(|item| item.contains("please respond"))
    );
    assert_eq!(response.actions.len(), 1);
    assert_eq!(response.actions[0].action_name, "escalate");
    assert_eq!(response.actions[0].payload["urgency"], "high");
}

#[test]
fn high_value_pdf_invoice_goes_to_finance_review() {
    let pipeline = Pipeline::new(
        Catalog::builtin(),
        ServiceRegistry::default(),
        Ledger::in_memory(),
    );
    let bytes = pdf_with_lines(&[
        &["INVOICE", "Invoice Number: 77", "Bill To: Northwind"],
        &["1 Consulting services 15000.00 15000.00", "Total: 15000.00"],
    ]);

    let response = pipeline
        .process(&bytes, "invoice.pdf", "application/pdf")
        .expect("process pdf");

    assert_eq!(response.classification.format, Format::PageDocument);
    let Some(NormalizedFields::Page(page)) = &response.extraction_result.normalized_fields else {
        panic!("expected page fields");
    };
    let PageKind::Invoice(invoice) = &page.kind else {
        panic!("expected invoice path");
    };
    assert_eq!(page.metadata.pages, 2);
    assert_eq!(invoice.total(), Some(15000.0));
    assert_eq!(invoice.flags[0].kind, "high_value");
    assert!(invoice.flags[0].message.contains("15,000.00"));
    assert_eq!(
        invoice.line_items,
        vec!["1 Consulting services 15000.00 15000.00".to_owned()]
    );

    assert_eq!(response.actions.len(), 1);
    assert_eq!(response.actions[0].service, Service::Finance);
    assert_eq!(response.actions[0].payload["invoice_total"], 15000.0);
}

#[test]
fn empty_input_is_an_unsupported_format_refusal() {
    let pipeline = Pipeline::new(
        Catalog::builtin(),
        ServiceRegistry::default(),
        Ledger::in_memory(),
    );

    let refusal = pipeline
        .process(b"", "empty", "application/octet-stream")
        .expect_err("refused");

    assert_eq!(refusal.code(), RefusalCode::UnsupportedFormat);
    let id = refusal.refusal.conversation_id.as_deref().expect("conversation id");
    let record = pipeline.get_record(id).expect("record exists");
    assert!(record.stage_output("extraction").is_none());
    assert_eq!(record.history.len(), 2);
}

#[test]
fn record_round_trips_through_the_ledger_file() {
    let tempdir = tempfile::tempdir().expect("create temp dir");
    let path = tempdir.path().join("ledger.json");

    let response = file_pipeline(&path)
        .process(NEGATIVE_INVOICE, "invoice.json", "application/json")
        .expect("process invoice");

    let reopened = file_pipeline(&path);
    let record = reopened
        .get_record(&response.conversation_id)
        .expect("record persisted");

    assert_eq!(record.metadata["filename"], "invoice.json");
    assert_eq!(record.metadata["content_type"], "application/json");
    assert_eq!(record.metadata["size"], NEGATIVE_INVOICE.len());
    let classification: Classification = serde_json::from_value(
        record
            .stage_output("classification")
            .cloned()
            .expect("classification stage"),
    )
    .expect("parse classification");
    assert_eq!(classification, response.classification);
    assert_eq!(
        record.stage_output("extraction").cloned(),
        Some(serde_json::to_value(&response.extraction_result).expect("serialize extraction"))
    );
    assert_eq!(
        record.stage_output("actions").expect("actions stage")["actions"][0]["request_id"],
        json!(response.actions[0].request_id)
    );
    assert_eq!(record.latest_output(), Some(&json!({ "outcome": "completed" })));
}

#[test]
fn classification_is_idempotent() {
    let pipeline = Pipeline::new(
        Catalog::builtin(),
        ServiceRegistry::default(),
        Ledger::in_memory(),
    );
    let bytes = pdf_with_lines(&[&["DATA PROTECTION POLICY", "GDPR applies to personal data."]]);

    let first = pipeline.classify(&bytes);
    let second = pipeline.classify(&bytes);

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).expect("serialize"),
        serde_json::to_string(&second).expect("serialize")
    );
    assert_eq!(pipeline.ledger().count(), 0);
}

#[test]
fn configured_catalog_changes_classification() {
    let tempdir = tempfile::tempdir().expect("create temp dir");
    let config = tempdir.path().join("docflow.yaml");
    std::fs::write(
        &config,
        "intents:\n  - intent: fraud_risk\n    high: [invoice]\n",
    )
    .expect("write config");

    let settings = Settings::load_with_env(
        Some(&tempdir.path().join("ledger.json")),
        Some(&config),
        |_| None,
    )
    .expect("load settings");
    let pipeline = Pipeline::from_settings(settings).expect("build pipeline");

    assert_eq!(pipeline.classify(NEGATIVE_INVOICE).intent, Intent::FraudRisk);
}
