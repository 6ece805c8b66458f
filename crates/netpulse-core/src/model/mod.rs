// ── Domain model ──
//
// Canonical types the pipeline operates on. Wire shapes live in
// `netpulse_api::models`; `crate::convert` maps between the two.

pub mod device;
pub mod snapshot;
pub mod status;

pub use device::{DeviceRecord, LimitRequest, MacAddress, SpeedLimit};
pub use snapshot::BandwidthSnapshot;
pub use status::ServiceStatus;
