//! Command dispatch: bridges CLI args -> core Commands -> output formatting.

pub mod chart;
pub mod config_cmd;
pub mod devices;
pub mod history;
pub mod interface;
pub mod limit;
pub mod service;
pub mod status;
pub mod totals;
pub mod util;

use netpulse_core::Controller;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a service-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Devices(args) => devices::handle(controller, &args, global).await,
        Command::Status => status::handle(controller, global).await,
        Command::Totals => totals::handle(controller, global).await,
        Command::History(args) => history::handle(controller, &args, global).await,
        Command::Limit(args) => limit::handle(controller, args, global).await,
        Command::Interface(args) => interface::handle(controller, args, global).await,
        Command::Service(args) => service::handle(controller, &args, global).await,
        Command::Chart(args) => chart::handle(controller, &args, global).await,
        // Handled before a controller is built
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
