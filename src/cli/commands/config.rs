use clap::Subcommand;

use crate::{
    cli::{output, CliContext},
    PortalError,
};

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective settings as JSON
    Show,

    /// Print the config file location
    Path,

    /// Change one setting and save it
    Set {
        /// Setting name, e.g. `page_size` or `currency`
        key: String,
        /// New value; an empty string clears optional settings
        value: String,
    },
}

pub fn run(context: &mut CliContext, command: ConfigCommand) -> Result<(), PortalError> {
    match command {
        ConfigCommand::Show => {
            println!("{}", serde_json::to_string_pretty(&context.config)?);
        }
        ConfigCommand::Path => {
            println!("{}", context.config_manager.config_path().display());
        }
        ConfigCommand::Set { key, value } => {
            context.config.set(&key, &value)?;
            context.config_manager.save(&context.config)?;
            tracing::info!(key = %key, "setting updated");
            output::success(format!("Saved `{key}`."));
        }
    }
    Ok(())
}
