use std::{
    fs::File,
    path::{Path, PathBuf},
    sync::Mutex,
};

mod bank;
mod bmi;
mod dashboard;
mod hotel;
mod init;
mod inventory;
mod library;
mod prompt;
mod terminal;
mod weather;

use anyhow::Context;
use bank::Bank;
use bmi::Bmi;
use clap::ArgAction;
use dashboard::Dashboard;
use deskwork::{domain::DEFAULT_CONFIG_FILE, Config};
use hotel::Hotel;
use inventory::Inventory;
use library::Library;
use weather::Weather;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Write the log to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose, self.log_file.as_deref())?;

        self.command
            .unwrap_or_else(|| Command::Inventory(Inventory::default()))
            .run(&self.config)
    }

    fn setup_logging(verbosity: u8, log_file: Option<&Path>) -> anyhow::Result<()> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let (stderr_layer, file_layer) = match log_file {
            None => {
                let layer = tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_thread_names(false)
                    .with_line_number(false);
                (Some(layer), None)
            }
            Some(path) => {
                let file = File::options()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("failed to open log file {}", path.display()))?;
                let layer = tracing_subscriber::fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(false)
                    .with_thread_names(false)
                    .with_line_number(false);
                (None, Some(layer))
            }
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Manage the inventory file (default)
    ///
    /// Without an action, opens the interactive menu.
    Inventory(Inventory),

    /// Compute a body mass index
    Bmi(Bmi),

    /// Average a week of temperatures
    Weather(Weather),

    /// Run the hotel reservation walkthrough
    Hotel(Hotel),

    /// Run the library loans walkthrough with an audit log
    Library(Library),

    /// Run the banking walkthrough or the interactive bank menu
    Bank(Bank),

    /// Browse unit folders and view or run their scripts
    Dashboard(Dashboard),

    /// Write a default configuration file
    Init(init::Command),
}

impl Command {
    fn run(self, config_path: &Path) -> anyhow::Result<()> {
        match self {
            Self::Inventory(command) => command.run(&load_config(config_path)?)?,
            Self::Bmi(command) => command.run()?,
            Self::Weather(command) => command.run()?,
            Self::Hotel(command) => command.run()?,
            Self::Library(command) => command.run()?,
            Self::Bank(command) => command.run(&load_config(config_path)?.bank)?,
            Self::Dashboard(command) => command.run(&load_config(config_path)?.dashboard)?,
            Self::Init(command) => command.run(config_path)?,
        }
        Ok(())
    }
}

/// Reads the configuration file, falling back to defaults when it is absent.
fn load_config(path: &Path) -> anyhow::Result<Config> {
    Config::load_or_default(path).with_context(|| format!("failed to load {}", path.display()))
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_opens_the_inventory() {
        let cli = Cli::try_parse_from(["desk"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_FILE));
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from(["desk", "bank", "-vv", "--config", "other.toml"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, PathBuf::from("other.toml"));
        assert!(matches!(cli.command, Some(Command::Bank(_))));
    }
}
