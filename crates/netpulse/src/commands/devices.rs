//! Device list handler.

use tabled::Tabled;

use netpulse_core::format::{fmt_bytes, fmt_kbps, fmt_rate};
use netpulse_core::sort::sort_devices;
use netpulse_core::{Controller, DeviceRecord, SortDirection, SortSpec};

use crate::cli::{DevicesArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "↓ Rate")]
    down_rate: String,
    #[tabled(rename = "↑ Rate")]
    up_rate: String,
    #[tabled(rename = "Downloaded")]
    downloaded: String,
    #[tabled(rename = "Uploaded")]
    uploaded: String,
    #[tabled(rename = "Limit")]
    limit: String,
}

impl DeviceRow {
    fn new(d: &DeviceRecord, color: bool) -> Self {
        Self {
            name: d.name.clone().unwrap_or_default(),
            ip: d.ip.map(|ip| ip.to_string()).unwrap_or_default(),
            mac: d.mac.to_string(),
            down_rate: output::download(&fmt_rate(d.download_rate), color),
            up_rate: output::upload(&fmt_rate(d.upload_rate), color),
            downloaded: fmt_bytes(d.downloaded),
            uploaded: fmt_bytes(d.uploaded),
            limit: limit_label(d),
        }
    }
}

/// `↓ 2.0 Mbps / ↑ 512 kbps`, or `-` when no limit is enforced.
fn limit_label(d: &DeviceRecord) -> String {
    d.active_limit().map_or_else(
        || "-".into(),
        |l| {
            let side = |v: Option<u64>| v.map_or_else(|| "∞".into(), fmt_kbps);
            format!("↓ {} / ↑ {}", side(l.download_kbps), side(l.upload_kbps))
        },
    )
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: &DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let devices = controller.list_devices().await?;

    let direction = if args.asc {
        SortDirection::Ascending
    } else if args.desc {
        SortDirection::Descending
    } else {
        args.sort.default_direction()
    };
    let sorted = sort_devices(&devices, SortSpec::new(args.sort, direction));

    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        &sorted,
        |d| DeviceRow::new(d, color),
        |d| d.mac.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
