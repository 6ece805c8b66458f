//! Service lifecycle handler.

use netpulse_core::{Command as CoreCommand, Controller, ServiceAction};

use crate::cli::{GlobalOpts, ServiceArgs};
use crate::commands::util;
use crate::error::CliError;
use crate::output;

pub async fn handle(
    controller: &Controller,
    args: &ServiceArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let action = ServiceAction::from(args.action);

    // Stopping or restarting interrupts measurement for everyone.
    if action != ServiceAction::Start {
        let prompt = format!("{action} the measurement service?");
        if !util::confirm(action.as_str(), &prompt, global.yes)? {
            return Ok(());
        }
    }

    let cmd = CoreCommand::Service(action);
    let description = cmd.describe();
    controller.execute(cmd).await?;
    output::print_output(&format!("Requested: {description}"), global.quiet);
    Ok(())
}
