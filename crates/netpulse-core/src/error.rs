// ── Core error types ──
//
// User-facing errors from netpulse-core. Frontends never see raw HTTP
// status codes or JSON parse failures; the `From<netpulse_api::Error>`
// impl folds them into domain variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach measurement service at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Request rejected by service: {message}")]
    Rejected {
        message: String,
        status: Option<u16>,
    },

    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Device not found: {identifier}")]
    DeviceNotFound { identifier: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<netpulse_api::Error> for CoreError {
    fn from(err: netpulse_api::Error) -> Self {
        match err {
            netpulse_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Rejected {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            netpulse_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            netpulse_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            netpulse_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            netpulse_api::Error::Http {
                endpoint,
                status,
                message,
            } => CoreError::Rejected {
                message: format!("{endpoint} (HTTP {status}): {message}"),
                status: Some(status),
            },
            netpulse_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CoreError;

    #[test]
    fn http_errors_become_rejections() {
        let err: CoreError = netpulse_api::Error::Http {
            endpoint: "limit".into(),
            status: 409,
            message: "limiter busy".into(),
        }
        .into();

        assert!(matches!(
            err,
            CoreError::Rejected {
                status: Some(409),
                ..
            }
        ));
        assert_eq!(
            err.to_string(),
            "Request rejected by service: limit (HTTP 409): limiter busy"
        );
    }

    #[test]
    fn timeouts_keep_duration() {
        let err: CoreError = netpulse_api::Error::Timeout { timeout_secs: 5 }.into();
        assert!(matches!(err, CoreError::Timeout { timeout_secs: 5 }));
    }
}
