use crate::document::Intent;
use crate::extract::{Extract, ExtractionResult, NormalizedFields};
use serde::Serialize;
use serde_json::{Map, Value, json};

const DEFAULT_CURRENCY: &str = "USD";

/// Provenance block attached to every normalized structured record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuredMetadata {
    pub intent: Intent,
    pub source: String,
    pub version: String,
}

/// Canonical field set for a structured-data document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuredFields {
    pub metadata: StructuredMetadata,
    pub content: Map<String, Value>,
}

impl StructuredFields {
    pub fn amount(&self) -> Option<f64> {
        self.content.get("amount").and_then(Value::as_f64)
    }

    pub fn quantity(&self) -> Option<i64> {
        self.content.get("quantity").and_then(Value::as_i64)
    }
}

/// Required canonical fields per intent.
pub fn required_fields(intent: Intent) -> &'static [&'static str] {
    match intent {
        Intent::Invoice => &["invoice_number", "amount", "due_date"],
        Intent::Rfq => &["product", "quantity", "delivery_date"],
        Intent::Complaint => &["issue", "severity", "customer_id"],
        Intent::Regulation => &["policy_id", "effective_date", "requirements"],
        Intent::FraudRisk | Intent::General | Intent::Unknown => &[],
    }
}

/// Maps JSON documents onto per-intent canonical fields and validates them.
#[derive(Debug, Clone, Default)]
pub struct StructuredExtractor;

impl StructuredExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Extract for StructuredExtractor {
    fn extract(&self, bytes: &[u8], intent: Intent) -> ExtractionResult {
        let text = match std::str::from_utf8(bytes) {
            Ok(text) => text,
            Err(error) => return ExtractionResult::failed(format!("invalid UTF-8 input: {error}")),
        };
        let data: Value = match serde_json::from_str(text) {
            Ok(data) => data,
            Err(_) => return ExtractionResult::failed("Invalid JSON format"),
        };

        match normalize(&data, intent) {
            Ok(fields) => {
                let missing = missing_required_fields(&fields.content, intent);
                let anomalies = detect_anomalies(&fields.content);
                let fields = NormalizedFields::Structured(fields);
                ExtractionResult::succeeded(fields, anomalies, missing)
            }
            Err(error) => ExtractionResult::failed(error),
        }
    }
}

/// Intents without a canonical mapping get empty content and never read the
/// source, so any JSON root is accepted for them.
fn normalize(data: &Value, intent: Intent) -> Result<StructuredFields, String> {
    let mut content = Map::new();
    match intent {
        Intent::Invoice => {
            let object = root_object(data)?;
            content.insert(
                "invoice_number".to_owned(),
                first_truthy(object, "invoice_number", "id"),
            );
            let amount = coerce_f64(object.get("amount"), "amount")?.unwrap_or(0.0);
            content.insert("amount".to_owned(), json!(amount));
            content.insert("due_date".to_owned(), field_or_null(object, "due_date"));
            content.insert(
                "currency".to_owned(),
                object
                    .get("currency")
                    .cloned()
                    .unwrap_or_else(|| json!(DEFAULT_CURRENCY)),
            );
            content.insert(
                "line_items".to_owned(),
                object.get("items").cloned().unwrap_or_else(|| json!([])),
            );
        }
        Intent::Rfq => {
            let object = root_object(data)?;
            content.insert("request_id".to_owned(), first_truthy(object, "id", "request_id"));
            content.insert("product".to_owned(), field_or_null(object, "product"));
            let quantity = coerce_i64(object.get("quantity"), "quantity")?.unwrap_or(0);
            content.insert("quantity".to_owned(), json!(quantity));
            content.insert("delivery_date".to_owned(), field_or_null(object, "delivery_date"));
            content.insert(
                "specifications".to_owned(),
                object.get("specs").cloned().unwrap_or_else(|| json!({})),
            );
        }
        Intent::Complaint => {
            let object = root_object(data)?;
            content.insert("issue".to_owned(), first_truthy(object, "issue", "description"));
            content.insert("severity".to_owned(), field_or_null(object, "severity"));
            content.insert(
                "customer_id".to_owned(),
                first_truthy(object, "customer_id", "customer"),
            );
            content.insert("order_id".to_owned(), field_or_null(object, "order_id"));
        }
        Intent::Regulation => {
            let object = root_object(data)?;
            content.insert("policy_id".to_owned(), first_truthy(object, "policy_id", "id"));
            content.insert(
                "effective_date".to_owned(),
                field_or_null(object, "effective_date"),
            );
            content.insert(
                "requirements".to_owned(),
                object.get("requirements").cloned().unwrap_or_else(|| json!([])),
            );
            content.insert("jurisdiction".to_owned(), field_or_null(object, "jurisdiction"));
        }
        Intent::FraudRisk | Intent::General | Intent::Unknown => {}
    }

    Ok(StructuredFields {
        metadata: StructuredMetadata {
            intent,
            source: "structured_data".to_owned(),
            version: "1.0".to_owned(),
        },
        content,
    })
}

/// Required fields that are absent or falsy, in declaration order.
fn missing_required_fields(content: &Map<String, Value>, intent: Intent) -> Vec<String> {
    required_fields(intent)
        .iter()
        .filter(|field| !content.get(**field).is_some_and(is_truthy))
        .map(|field| (*field).to_owned())
        .collect()
}

fn detect_anomalies(content: &Map<String, Value>) -> Vec<String> {
    let mut anomalies = Vec::new();

    if content
        .get("amount")
        .and_then(Value::as_f64)
        .is_some_and(|amount| amount < 0.0)
    {
        anomalies.push("Negative amount detected".to_owned());
    }

    if content
        .get("quantity")
        .and_then(Value::as_f64)
        .is_some_and(|quantity| quantity <= 0.0)
    {
        anomalies.push("Invalid quantity".to_owned());
    }

    anomalies
}

/// `null`, `false`, zero, and empty strings/arrays/objects are falsy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// `primary` when truthy, otherwise `fallback` (or null when absent).
fn first_truthy(object: &Map<String, Value>, primary: &str, fallback: &str) -> Value {
    match object.get(primary) {
        Some(value) if is_truthy(value) => value.clone(),
        _ => field_or_null(object, fallback),
    }
}

fn field_or_null(object: &Map<String, Value>, key: &str) -> Value {
    object.get(key).cloned().unwrap_or(Value::Null)
}

/// Absent → `None`; numbers, numeric strings and booleans coerce; anything else fails.
fn coerce_f64(value: Option<&Value>, field: &str) -> Result<Option<f64>, String> {
    let Some(value) = value else {
        return Ok(None);
    };
    let coerced = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        _ => None,
    };
    coerced
        .map(Some)
        .ok_or_else(|| format!("field '{field}' is not numeric: {value}"))
}

/// Like [`coerce_f64`] but integral: floats truncate, strings must be integers.
fn coerce_i64(value: Option<&Value>, field: &str) -> Result<Option<i64>, String> {
    let Some(value) = value else {
        return Ok(None);
    };
    let coerced = match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|n| n.is_finite()).map(|n| n.trunc() as i64)),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        Value::Bool(flag) => Some(i64::from(*flag)),
        _ => None,
    };
    coerced
        .map(Some)
        .ok_or_else(|| format!("field '{field}' is not an integer: {value}"))
}

fn root_object(data: &Value) -> Result<&Map<String, Value>, String> {
    data.as_object().ok_or_else(|| {
        format!(
            "expected a JSON object at the document root, found {}",
            value_kind(data)
        )
    })
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
