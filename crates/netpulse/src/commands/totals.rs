//! Traffic totals handler.
//!
//! Totals are derived from the device list; the service's own counters are
//! shown alongside when that endpoint answers.

use serde::Serialize;

use netpulse_core::format::{fmt_bytes, fmt_rate};
use netpulse_core::{Controller, TrafficTotals, stats};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct TotalsView {
    devices: usize,
    #[serde(flatten)]
    totals: TrafficTotals,
    #[serde(skip_serializing_if = "Option::is_none")]
    reported: Option<TrafficTotals>,
}

fn detail(v: &TotalsView, color: bool) -> String {
    let t = &v.totals;
    let mut lines = vec![
        format!("Devices:    {}", v.devices),
        format!("Downloaded: {}", output::download(&fmt_bytes(t.downloaded), color)),
        format!("Uploaded:   {}", output::upload(&fmt_bytes(t.uploaded), color)),
        format!("Combined:   {}", fmt_bytes(t.combined)),
        format!("↓ Rate:     {}", output::download(&fmt_rate(t.download_rate), color)),
        format!("↑ Rate:     {}", output::upload(&fmt_rate(t.upload_rate), color)),
    ];
    if let Some(r) = v.reported {
        lines.push(format!("Service:    {} total", fmt_bytes(r.combined)));
    }
    lines.join("\n")
}

pub async fn handle(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    let (devices, reported) = tokio::join!(controller.list_devices(), controller.get_totals());
    let devices = devices?;
    let reported = reported
        .inspect_err(|e| tracing::debug!(error = %e, "service totals unavailable"))
        .ok();

    let view = TotalsView {
        devices: devices.len(),
        totals: stats::aggregate(&devices),
        reported,
    };
    let color = output::should_color(&global.color);

    let out = output::render_single(
        &global.output,
        &view,
        |v| detail(v, color),
        |v| v.totals.combined.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
