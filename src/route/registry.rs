use crate::route::{RouteError, Service};
use std::collections::BTreeMap;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8001";

/// Closed mapping of logical services to endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRegistry {
    endpoints: BTreeMap<Service, String>,
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::from_endpoints(
            Service::ALL
                .into_iter()
                .map(|service| (service, format!("{DEFAULT_BASE_URL}/{service}")))
                .collect(),
        )
    }
}

impl ServiceRegistry {
    pub fn from_endpoints(endpoints: BTreeMap<Service, String>) -> Self {
        Self { endpoints }
    }

    pub fn with_endpoint(mut self, service: Service, endpoint: impl Into<String>) -> Self {
        self.endpoints.insert(service, endpoint.into());
        self
    }

    pub fn endpoints(&self) -> &BTreeMap<Service, String> {
        &self.endpoints
    }

    /// Endpoint for `service`, or `RouteError::UnknownService` when it was never registered.
    pub fn resolve(&self, service: Service) -> Result<&str, RouteError> {
        self.endpoints
            .get(&service)
            .map(String::as_str)
            .ok_or_else(|| RouteError::UnknownService(service.as_str().to_owned()))
    }
}
