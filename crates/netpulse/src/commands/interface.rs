//! Monitored interface handlers.

use netpulse_core::{Command as CoreCommand, Controller};

use crate::cli::{GlobalOpts, InterfaceArgs, InterfaceCommand};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    controller: &Controller,
    args: InterfaceArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        InterfaceCommand::Show => {
            let status = controller.get_status().await?;
            output::print_output(&status.interface, global.quiet);
            Ok(())
        }
        InterfaceCommand::Set { name } => {
            controller
                .execute(CoreCommand::SetInterface {
                    interface: name.clone(),
                })
                .await?;
            output::print_output(&format!("Now monitoring {}", name.trim()), global.quiet);
            Ok(())
        }
    }
}
