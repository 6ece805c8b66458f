//! Per-device limit handlers.

use netpulse_core::format::fmt_kbps;
use netpulse_core::{Command as CoreCommand, Controller, DashboardConfig, LimitRequest, MacAddress};

use crate::cli::{GlobalOpts, LimitArgs, LimitCommand};
use crate::error::CliError;
use crate::output;

/// Resolve explicit `--down/--up` or a named preset into kbps values.
fn resolve_kbps(
    config: &DashboardConfig,
    down: Option<u64>,
    up: Option<u64>,
    preset: Option<&str>,
) -> Result<(u64, u64), CliError> {
    if let Some(name) = preset {
        let p = config.preset(name).ok_or_else(|| CliError::PresetNotFound {
            name: name.into(),
            available: available_presets(config),
        })?;
        return Ok((p.download_kbps, p.upload_kbps));
    }
    match (down, up) {
        (Some(d), Some(u)) => Ok((d, u)),
        _ => Err(CliError::Validation {
            field: "limit".into(),
            reason: "both --down and --up are required without --preset".into(),
        }),
    }
}

fn available_presets(config: &DashboardConfig) -> String {
    if config.presets.is_empty() {
        return "(none)".into();
    }
    config
        .presets
        .iter()
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub async fn handle(
    controller: &Controller,
    args: LimitArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        LimitCommand::Set {
            mac,
            down,
            up,
            preset,
        } => {
            let (download_kbps, upload_kbps) =
                resolve_kbps(controller.config(), down, up, preset.as_deref())?;
            let request = LimitRequest {
                mac: MacAddress::new(&mac),
                enabled: true,
                download_kbps,
                upload_kbps,
            };
            let target = request.mac.clone();
            controller.execute(CoreCommand::SetLimit(request)).await?;
            output::print_output(
                &format!(
                    "Limit requested for {target}: ↓ {} / ↑ {}",
                    fmt_kbps(download_kbps),
                    fmt_kbps(upload_kbps)
                ),
                global.quiet,
            );
            Ok(())
        }
        LimitCommand::Clear { mac } => {
            let mac = MacAddress::new(&mac);
            controller
                .execute(CoreCommand::ClearLimit { mac: mac.clone() })
                .await?;
            output::print_output(&format!("Limit removed for {mac}"), global.quiet);
            Ok(())
        }
    }
}
