//! Settings command - inspect, migrate and reset stored profiles

use colored::Colorize;
use tracing::debug;

use crate::{
    BucketviewError,
    cli::SettingsCommands,
    output,
    settings::{SETTINGS_VERSION, SettingsStore},
    store::KeyValueStore,
};

use super::confirm;

type Result<T> = std::result::Result<T, BucketviewError>;

/// Execute a settings subcommand
///
/// # Errors
///
/// Returns `BucketviewError` if the store fails or the prompt cannot be read.
pub fn execute<S: KeyValueStore>(store: S, command: &SettingsCommands, quiet: bool) -> Result<()> {
    let mut settings = SettingsStore::open(store)?;

    match command {
        SettingsCommands::Show => show(&settings, quiet),
        SettingsCommands::Migrate { yes } => migrate(&mut settings, *yes || quiet, quiet),
        SettingsCommands::Reset { yes } => reset(&mut settings, *yes || quiet, quiet),
    }
}

fn show<S: KeyValueStore>(settings: &SettingsStore<S>, quiet: bool) -> Result<()> {
    if !quiet {
        println!("Stored settings: {}", output::settings_state(settings.stored_state()?));
    }

    let profiles = settings.profiles();
    for (index, (name, options)) in profiles.list.iter().enumerate() {
        if quiet {
            println!("{name}");
        } else {
            println!("{}", output::profile_line(name, options, index == profiles.current));
            if !options.access_key_id.is_empty() {
                println!("    key {} / secret {}", options.access_key_id, options.masked_secret());
            }
        }
    }
    Ok(())
}

fn migrate<S: KeyValueStore>(settings: &mut SettingsStore<S>, assume_yes: bool, quiet: bool) -> Result<()> {
    let state = settings.stored_state()?;
    if !state.needs_migration() {
        if !quiet {
            println!("Nothing to migrate ({}).", output::settings_state(state));
        }
        return Ok(());
    }

    let prompt = format!(
        "Found {state} with {} profile(s). Rewrite as version {SETTINGS_VERSION}?",
        settings.profiles().list.len()
    );
    if !confirm(&prompt, assume_yes)? {
        if !quiet {
            println!("Left stored settings unchanged.");
        }
        return Ok(());
    }

    settings.persist()?;
    debug!(%state, "settings rewritten at current version");
    if !quiet {
        println!("{}", format!("Settings migrated to version {SETTINGS_VERSION}.").green());
    }
    Ok(())
}

fn reset<S: KeyValueStore>(settings: &mut SettingsStore<S>, assume_yes: bool, quiet: bool) -> Result<()> {
    if !confirm("Forget all stored profiles?", assume_yes)? {
        return Ok(());
    }
    settings.reset()?;
    if !quiet {
        println!("Stored settings removed.");
    }
    Ok(())
}
