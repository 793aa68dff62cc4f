//! Terminal front-end: argument parsing, console output and the command
//! handlers behind `portal_cli`.

pub mod commands;
pub mod navigation;
pub mod output;
pub mod ui;

use std::{path::PathBuf, sync::Arc};

use clap::{Parser, Subcommand};
use portal_config::{Config, ConfigManager};
use portal_store_json::JsonRecordStore;
use tracing::debug;

use crate::PortalError;

use self::{
    commands::{config::ConfigCommand, list::ListArgs, trip::TripCommand},
    navigation::LocalNavigator,
    output::{ConsoleNotifier, OutputPreferences},
};

#[derive(Debug, Parser)]
#[command(name = "portal_cli")]
#[command(about = "Browse portal lists and plan donor trips", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true, env = "CRM_PORTAL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding datasets and trips (overrides the config)
    #[arg(long, global = true, env = "CRM_PORTAL_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Only print warnings, errors and results
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colors and box-drawing characters
    #[arg(long, global = true)]
    pub plain: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show one page of a dataset as a sortable, filterable table
    List(ListArgs),

    /// Plan, inspect and mail trips
    #[command(subcommand)]
    Trip(TripCommand),

    /// Show or change settings
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Print build information
    Version,
}

/// Shared state handed to every command handler.
pub struct CliContext {
    pub config: Config,
    pub config_manager: ConfigManager,
    pub data_dir: PathBuf,
    pub notifier: Arc<ConsoleNotifier>,
    pub navigator: Arc<LocalNavigator>,
}

impl CliContext {
    pub fn load(cli: &Cli) -> Result<Self, PortalError> {
        let config_manager = match &cli.config {
            Some(path) => ConfigManager::new(path.clone()),
            None => ConfigManager::default_location(),
        };
        let config = config_manager.load()?;
        let data_dir = cli
            .data_dir
            .clone()
            .unwrap_or_else(|| config.resolve_data_root());

        output::set_preferences(OutputPreferences {
            quiet_mode: cli.quiet,
            plain_mode: cli.plain || !config.ui_color_enabled,
        });

        Ok(Self {
            config,
            config_manager,
            data_dir,
            notifier: Arc::new(ConsoleNotifier),
            navigator: Arc::new(LocalNavigator::default()),
        })
    }

    pub fn store(&self) -> Result<Arc<JsonRecordStore>, PortalError> {
        Ok(Arc::new(JsonRecordStore::new(self.data_dir.clone())?))
    }
}

/// Runs a parsed command line.
pub async fn run(cli: Cli) -> Result<(), PortalError> {
    let mut context = CliContext::load(&cli)?;
    crate::init_with_filter(context.config.log_filter.as_deref());
    debug!(data_dir = %context.data_dir.display(), "cli context ready");

    match cli.command {
        Commands::List(args) => commands::list::run(&context, args).await,
        Commands::Trip(command) => commands::trip::run(&context, command).await,
        Commands::Config(command) => commands::config::run(&mut context, command),
        Commands::Version => {
            println!("{}", crate::utils::build_info::current());
            Ok(())
        }
    }
}
