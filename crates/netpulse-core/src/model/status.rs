use serde::{Deserialize, Serialize};

/// Interface name reported when the status read fails.
pub const UNKNOWN_INTERFACE: &str = "unknown";

/// Measurement service state. Replaced wholesale every poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub running: bool,
    pub interface: String,
    pub uptime_secs: u64,
    pub version: Option<String>,
}

impl ServiceStatus {
    /// What the dashboard shows when the status endpoint is unreachable.
    pub fn fallback() -> Self {
        Self {
            running: false,
            interface: UNKNOWN_INTERFACE.into(),
            uptime_secs: 0,
            version: None,
        }
    }
}

impl Default for ServiceStatus {
    fn default() -> Self {
        Self::fallback()
    }
}
