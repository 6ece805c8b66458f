// ── Command API ──
//
// Every write against the measurement service flows through `Command`.
// The controller validates, sends, and then sequences a refresh behind any
// in-flight poll cycle so the next snapshot reflects the write.

use netpulse_api::ServiceAction;

use crate::error::CoreError;
use crate::model::{LimitRequest, MacAddress};
use crate::poller::CycleReport;

/// All write operations against the measurement service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Request (or change) a device's speed limit.
    SetLimit(LimitRequest),
    /// Remove a device's limit (sends the null sentinel).
    ClearLimit { mac: MacAddress },
    /// Switch the monitored interface.
    SetInterface { interface: String },
    /// Start, stop, or restart the service.
    Service(ServiceAction),
}

impl Command {
    /// Reject commands that cannot succeed before touching the network.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::SetLimit(req) => {
                if req.mac.as_str().is_empty() {
                    return Err(CoreError::validation("device address is required"));
                }
                if req.enabled && (req.download_kbps == 0 || req.upload_kbps == 0) {
                    return Err(CoreError::validation(
                        "limits must be greater than 0 kbps",
                    ));
                }
                Ok(())
            }
            Self::ClearLimit { mac } if mac.as_str().is_empty() => {
                Err(CoreError::validation("device address is required"))
            }
            Self::SetInterface { interface } => {
                let name = interface.trim();
                if name.is_empty() {
                    Err(CoreError::validation("interface name is required"))
                } else if name.chars().any(char::is_whitespace) {
                    Err(CoreError::validation(format!(
                        "invalid interface name: {name:?}"
                    )))
                } else {
                    Ok(())
                }
            }
            Self::ClearLimit { .. } | Self::Service(_) => Ok(()),
        }
    }

    /// Short description for notifications and logs.
    pub fn describe(&self) -> String {
        match self {
            Self::SetLimit(req) => format!(
                "limit {} to ↓{} / ↑{} kbps",
                req.mac, req.download_kbps, req.upload_kbps
            ),
            Self::ClearLimit { mac } => format!("clear limit on {mac}"),
            Self::SetInterface { interface } => format!("switch interface to {}", interface.trim()),
            Self::Service(action) => format!("{action} service"),
        }
    }
}

/// Result of a command execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandResult {
    /// Accepted; no follow-up refresh was run.
    Ok,
    /// Accepted and the store was refreshed afterwards.
    Refreshed(CycleReport),
}
