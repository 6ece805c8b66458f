// netpulse-api: Async Rust client for the netpulse measurement service
//
// Thin transport layer: URL construction, JSON decoding, and HTTP status
// mapping. No retries and no fallbacks live here -- `netpulse-core`
// decides how each failure is masked.

pub mod client;
pub mod control;
pub mod error;
pub mod models;
pub mod telemetry;
pub mod transport;

pub use client::ApiClient;
pub use error::Error;
pub use models::{
    DeviceEntry, HistoryPoint, LimitPayload, ServiceAction, SpeedLimitEntry, StatusEntry,
    TotalsEntry,
};
pub use transport::{TlsMode, TransportConfig};
