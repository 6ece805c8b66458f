// Read endpoints
//
// Device list, bandwidth history, service status, and aggregate totals.
// Each is a plain GET with no body; failures come back untouched so the
// poller can mask them per endpoint.

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{DeviceEntry, HistoryPoint, StatusEntry, TotalsEntry};

impl ApiClient {
    /// List monitored devices.
    ///
    /// `GET /api/devices`
    pub async fn list_devices(&self) -> Result<Vec<DeviceEntry>, Error> {
        let url = self.api_url("devices")?;
        debug!("listing devices");
        self.get("devices", url).await
    }

    /// Aggregate throughput history, oldest first.
    ///
    /// `GET /api/history`
    pub async fn get_history(&self) -> Result<Vec<HistoryPoint>, Error> {
        let url = self.api_url("history")?;
        debug!("fetching bandwidth history");
        self.get("history", url).await
    }

    /// Service status.
    ///
    /// `GET /api/status`
    pub async fn get_status(&self) -> Result<StatusEntry, Error> {
        let url = self.api_url("status")?;
        debug!("fetching service status");
        self.get("status", url).await
    }

    /// Service-side cumulative totals.
    ///
    /// `GET /api/totals`
    pub async fn get_totals(&self) -> Result<TotalsEntry, Error> {
        let url = self.api_url("totals")?;
        debug!("fetching totals");
        self.get("totals", url).await
    }
}
