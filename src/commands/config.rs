//! Config command - show the effective configuration

use crate::{BucketviewError, cli::ConfigCommands, config::BucketviewConfig};

type Result<T> = std::result::Result<T, BucketviewError>;

/// Execute a config subcommand
///
/// # Errors
///
/// Returns `BucketviewError` if the configuration cannot be serialized or its
/// location cannot be determined.
pub fn execute(config: &BucketviewConfig, command: &ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => print!("{}", config.to_toml()?),
        ConfigCommands::Path => println!("{}", BucketviewConfig::config_path()?.display()),
    }
    Ok(())
}
