//! Service status handler.

use netpulse_core::format::fmt_uptime;
use netpulse_core::{Controller, ServiceStatus};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

fn detail(s: &ServiceStatus, color: bool) -> String {
    [
        format!("State:     {}", output::running(s.running, color)),
        format!("Interface: {}", s.interface),
        format!("Uptime:    {}", fmt_uptime(s.uptime_secs)),
        format!("Version:   {}", s.version.as_deref().unwrap_or("-")),
    ]
    .join("\n")
}

pub async fn handle(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    let status = controller.get_status().await?;
    let color = output::should_color(&global.color);

    let out = output::render_single(
        &global.output,
        &status,
        |s| detail(s, color),
        |s| output::running(s.running, false),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
