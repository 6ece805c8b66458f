// Write endpoints
//
// Limit, interface, and service lifecycle requests. The service answers
// with an empty 2xx on success; any other status is a failed write.

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{LimitPayload, ServiceAction, SetInterfaceBody, SetLimitBody};

impl ApiClient {
    /// Request a speed limit for a device, or clear it with `None`.
    ///
    /// `POST /api/limit` with `{"mac": "...", "limit": {...} | null}`
    pub async fn set_limit(&self, mac: &str, limit: Option<LimitPayload>) -> Result<(), Error> {
        let url = self.api_url("limit")?;
        debug!(mac, ?limit, "setting speed limit");
        self.post("limit", url, Some(&SetLimitBody { mac, limit }))
            .await
    }

    /// Switch the monitored network interface.
    ///
    /// `POST /api/interface` with `{"interface": "..."}`
    pub async fn set_interface(&self, interface: &str) -> Result<(), Error> {
        let url = self.api_url("interface")?;
        debug!(interface, "switching interface");
        self.post("interface", url, Some(&SetInterfaceBody { interface }))
            .await
    }

    /// Start, stop, or restart the measurement service.
    ///
    /// `POST /api/service/{action}`
    pub async fn control_service(&self, action: ServiceAction) -> Result<(), Error> {
        let url = self.api_url(&format!("service/{action}"))?;
        debug!(%action, "service control");
        self.post("service", url, None::<&()>).await
    }
}
