pub mod dispatch;
pub mod registry;
pub mod router;

pub use dispatch::{Dispatcher, SimulatedDispatcher};
pub use registry::ServiceRegistry;
pub use router::{ActionRouter, RoutingOutcome};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Downstream business services reachable from the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Service {
    Crm,
    Risk,
    Compliance,
    Finance,
}

impl Service {
    pub const ALL: [Service; 4] = [
        Service::Crm,
        Service::Risk,
        Service::Compliance,
        Service::Finance,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Service::Crm => "crm",
            Service::Risk => "risk",
            Service::Compliance => "compliance",
            Service::Finance => "finance",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Service {
    type Err = RouteError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Service::ALL
            .into_iter()
            .find(|service| service.as_str() == name)
            .ok_or_else(|| RouteError::UnknownService(name.to_owned()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Success,
    Failed,
}

/// One issued call to a downstream service. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub service: Service,
    pub action_name: String,
    pub endpoint: String,
    pub payload: Value,
    pub status: ActionStatus,
    pub request_id: String,
    pub issued_at: String,
}

/// Failures that abort a routing run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// A rule targeted a service with no registered endpoint.
    UnknownService(String),
    /// An action payload could not be assembled.
    Payload(String),
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::UnknownService(name) => {
                write!(f, "service '{name}' is not registered")
            }
            RouteError::Payload(error) => write!(f, "failed to build action payload: {error}"),
        }
    }
}

impl std::error::Error for RouteError {}
