use crate::route::{ActionStatus, Service};
use serde_json::Value;

/// Delivery of one action to a downstream endpoint.
///
/// Implementations report transport failures as `Err`; the router records
/// those as `failed` actions rather than aborting the run.
pub trait Dispatcher: Send + Sync {
    fn dispatch(
        &self,
        endpoint: &str,
        service: Service,
        action: &str,
        payload: &Value,
    ) -> Result<ActionStatus, String>;
}

/// Default dispatcher: every call succeeds without leaving the process.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedDispatcher;

impl Dispatcher for SimulatedDispatcher {
    fn dispatch(
        &self,
        endpoint: &str,
        service: Service,
        action: &str,
        _payload: &Value,
    ) -> Result<ActionStatus, String> {
        tracing::debug!(%service, action, endpoint, "simulated dispatch");
        Ok(ActionStatus::Success)
    }
}
