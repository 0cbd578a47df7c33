//! Command implementations
//!
//! Each command is a module with an execute function that takes parsed CLI args
//! and runs the operation against the core library.

pub mod config;
pub mod filter;
pub mod key;
pub mod layout;
pub mod settings;

use crate::BucketviewError;
use dialoguer::{Confirm, theme::ColorfulTheme};

// Re-export execute functions for convenience
pub use config::execute as config;
pub use filter::execute as filter;
pub use key::execute as key;
pub use layout::execute as layout;
pub use settings::execute as settings;

type Result<T> = std::result::Result<T, BucketviewError>;

/// Ask a yes/no question, defaulting to no
///
/// Auto-confirms when `assume_yes` is set.
///
/// # Errors
///
/// Returns `BucketviewError::InvalidInput` if the terminal cannot be read.
pub fn confirm(prompt: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }

    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| BucketviewError::InvalidInput(format!("Failed to read input: {e}")))
}
