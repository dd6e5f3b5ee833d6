use crate::document::{Classification, Format, Intent};
use crate::extract::page::{PageKind, Severity};
use crate::extract::{
    ExtractionResult, MessageFields, NormalizedFields, PageFields, StructuredFields, Tone, Urgency,
    now_rfc3339,
};
use crate::route::{
    Action, ActionStatus, Dispatcher, RouteError, Service, ServiceRegistry, SimulatedDispatcher,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Wrapper returned by every routing run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingOutcome {
    pub success: bool,
    pub actions: Vec<Action>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: String,
}

impl RoutingOutcome {
    fn routed(actions: Vec<Action>) -> Self {
        Self {
            success: true,
            actions,
            error: None,
            timestamp: now_rfc3339(),
        }
    }

    fn failed(error: &RouteError) -> Self {
        Self {
            success: false,
            actions: Vec::new(),
            error: Some(error.to_string()),
            timestamp: now_rfc3339(),
        }
    }
}

/// A rule that fired, before endpoint resolution.
struct PlannedAction {
    service: Service,
    action: &'static str,
    payload: Value,
}

/// Applies the per-format rule table to one extraction result.
pub struct ActionRouter {
    registry: ServiceRegistry,
    dispatcher: Box<dyn Dispatcher>,
    high_value_threshold: f64,
}

impl ActionRouter {
    pub fn new(registry: ServiceRegistry, high_value_threshold: f64) -> Self {
        Self::with_dispatcher(registry, high_value_threshold, SimulatedDispatcher)
    }

    pub fn with_dispatcher(
        registry: ServiceRegistry,
        high_value_threshold: f64,
        dispatcher: impl Dispatcher + 'static,
    ) -> Self {
        Self {
            registry,
            dispatcher: Box::new(dispatcher),
            high_value_threshold,
        }
    }

    /// Route one extraction. Never panics or returns early with a partial
    /// list: any failure yields `success: false` and no actions.
    pub fn route(
        &self,
        extraction: &ExtractionResult,
        classification: &Classification,
    ) -> RoutingOutcome {
        match self.try_route(extraction, classification) {
            Ok(actions) => RoutingOutcome::routed(actions),
            Err(error) => {
                tracing::warn!(%error, "action routing failed");
                RoutingOutcome::failed(&error)
            }
        }
    }

    fn try_route(
        &self,
        extraction: &ExtractionResult,
        classification: &Classification,
    ) -> Result<Vec<Action>, RouteError> {
        if !extraction.success {
            return Ok(Vec::new());
        }
        let Some(fields) = &extraction.normalized_fields else {
            return Ok(Vec::new());
        };

        let planned = match (classification.format, fields) {
            (Format::Message, NormalizedFields::Message(message)) => message_rules(message)?,
            (Format::StructuredData, NormalizedFields::Structured(structured)) => {
                structured_rules(structured, extraction)?
            }
            (Format::PageDocument, NormalizedFields::Page(page)) => self.page_rules(page)?,
            _ => Vec::new(),
        };

        // Every endpoint resolves before anything is dispatched.
        let resolved = planned
            .into_iter()
            .map(|plan| {
                let endpoint = self.registry.resolve(plan.service)?.to_owned();
                Ok((plan, endpoint))
            })
            .collect::<Result<Vec<_>, RouteError>>()?;

        // Seconds alone collide across runs; the uuid tag is per run.
        let run = uuid::Uuid::new_v4().simple().to_string();
        let stamp = format!(
            "{}_{}",
            chrono::Utc::now().format("%Y%m%d%H%M%S"),
            &run[..8]
        );
        Ok(resolved
            .into_iter()
            .enumerate()
            .map(|(ordinal, (plan, endpoint))| self.issue(plan, endpoint, &stamp, ordinal))
            .collect())
    }

    fn issue(&self, plan: PlannedAction, endpoint: String, stamp: &str, ordinal: usize) -> Action {
        let request_id = format!("{}_{}_{stamp}_{ordinal}", plan.service, plan.action);
        let status = match self
            .dispatcher
            .dispatch(&endpoint, plan.service, plan.action, &plan.payload)
        {
            Ok(status) => status,
            Err(error) => {
                tracing::warn!(
                    service = %plan.service,
                    action = plan.action,
                    %error,
                    "dispatch failed"
                );
                ActionStatus::Failed
            }
        };

        tracing::info!(
            service = %plan.service,
            action = plan.action,
            request_id = %request_id,
            status = ?status,
            "action issued"
        );
        tracing::debug!(request_id = %request_id, payload = %plan.payload, "action payload");

        Action {
            service: plan.service,
            action_name: plan.action.to_owned(),
            endpoint,
            payload: plan.payload,
            status,
            request_id,
            issued_at: now_rfc3339(),
        }
    }

    fn page_rules(&self, page: &PageFields) -> Result<Vec<PlannedAction>, RouteError> {
        let mut planned = Vec::new();
        match &page.kind {
            PageKind::Invoice(invoice) => {
                if let Some(total) = invoice.total()
                    && total > self.high_value_threshold
                {
                    planned.push(PlannedAction {
                        service: Service::Finance,
                        action: "high_value_review",
                        payload: json!({
                            "invoice_total": total,
                            "invoice_data": to_value(page)?,
                        }),
                    });
                }
            }
            PageKind::Policy(policy) => {
                for flag in policy
                    .compliance_flags
                    .iter()
                    .filter(|flag| flag.severity == Severity::High)
                {
                    planned.push(PlannedAction {
                        service: Service::Compliance,
                        action: "review_required",
                        payload: json!({
                            "category": flag.category,
                            "matches": flag.matches,
                        }),
                    });
                }
            }
        }
        Ok(planned)
    }
}

fn message_rules(message: &MessageFields) -> Result<Vec<PlannedAction>, RouteError> {
    let mut planned = Vec::new();
    let urgency = message.metadata.urgency;
    let tone = message.content.tone;

    if urgency == Urgency::High || matches!(tone, Tone::Angry | Tone::Threatening) {
        planned.push(PlannedAction {
            service: Service::Crm,
            action: "escalate",
            payload: json!({
                "sender": to_value(&message.metadata.sender)?,
                "urgency": urgency,
                "tone": tone,
                "content": to_value(&message.content)?,
            }),
        });
    }

    if message.content.intent == Intent::Complaint {
        let priority = if urgency == Urgency::High {
            "high"
        } else {
            "medium"
        };
        planned.push(PlannedAction {
            service: Service::Crm,
            action: "create_ticket",
            payload: json!({
                "type": "complaint",
                "priority": priority,
                "content": to_value(&message.content)?,
            }),
        });
    }

    Ok(planned)
}

fn structured_rules(
    structured: &StructuredFields,
    extraction: &ExtractionResult,
) -> Result<Vec<PlannedAction>, RouteError> {
    let mut planned = Vec::new();
    let source_data = Value::Object(structured.content.clone());

    if !extraction.anomalies.is_empty() {
        planned.push(PlannedAction {
            service: Service::Risk,
            action: "report_anomaly",
            payload: json!({
                "anomalies": extraction.anomalies,
                "source_data": source_data,
            }),
        });
    }

    if !extraction.missing_required_fields.is_empty() {
        planned.push(PlannedAction {
            service: Service::Risk,
            action: "validation_error",
            payload: json!({
                "missing_fields": extraction.missing_required_fields,
                "source_data": source_data,
            }),
        });
    }

    Ok(planned)
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, RouteError> {
    serde_json::to_value(value).map_err(|error| RouteError::Payload(error.to_string()))
}
