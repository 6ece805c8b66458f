//! Config subcommand handlers.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let cfg = config::apply_overrides(config::load_config()?, global);
            let out = if matches!(global.output, OutputFormat::Table | OutputFormat::Plain) {
                toml::to_string_pretty(&cfg)?
            } else {
                output::render_single(&global.output, &cfg, |_| String::new(), |_| String::new())?
            };
            output::print_output(out.trim_end(), global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Init { force } => {
            let path = config::config_path();
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }

            let cfg = config::apply_overrides(Config::default(), global);
            cfg.validate()?;
            config::save_config_to(&cfg, &path)?;
            output::print_output(
                &format!("Wrote {} (server = {})", path.display(), cfg.server),
                global.quiet,
            );
            Ok(())
        }
    }
}
