//! `saudit config`: show the effective config, validate a file.

use std::path::{Path, PathBuf};

use clap::Subcommand;

use crate::settings::{load_config_file, user_config_path, Settings};
use crate::CliError;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    #[command(after_help = "\
Examples:
  saudit config show
  saudit config show > ~/.config/sampleaudit/config.toml
  saudit --config lab.toml config show")]
    Show,

    /// Parse and validate a config file without running anything
    #[command(after_help = "\
Examples:
  saudit config validate lab.toml")]
    Validate {
        /// Path to the config file
        path: PathBuf,
    },

    /// Print the per-user config file location
    Path,
}

pub fn cmd_config(cmd: ConfigCommands, config_flag: Option<&Path>) -> Result<(), CliError> {
    match cmd {
        ConfigCommands::Show => {
            let settings = Settings::resolve(config_flag)?;
            let text = settings.config.to_toml()?;
            eprintln!("# source: {}", settings.source);
            print!("{text}");
            Ok(())
        }
        ConfigCommands::Validate { path } => {
            load_config_file(&path)?;
            eprintln!("{}: ok", path.display());
            Ok(())
        }
        ConfigCommands::Path => match user_config_path() {
            Some(path) => {
                println!("{}", path.display());
                Ok(())
            }
            None => Err(CliError::io("no config directory on this platform")),
        },
    }
}
