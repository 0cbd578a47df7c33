//! Key command - render the object key an upload would get

use chrono::Utc;
use tracing::debug;

use crate::{
    BucketviewError,
    config::BucketviewConfig,
    keys::{KeyTemplateContext, UlidGenerator, render},
    settings::{ProfileOptions, SettingsStore, StoredSettings},
    store::KeyValueStore,
};

type Result<T> = std::result::Result<T, BucketviewError>;

/// Template and conversion target for a key
///
/// The command-line flags win, then the active stored profile, then the
/// configuration file.
#[must_use]
pub fn resolve<'a>(
    template: Option<&'a str>,
    ext: Option<&'a str>,
    profile: Option<&'a ProfileOptions>,
    config: &'a BucketviewConfig,
) -> (&'a str, Option<&'a str>) {
    let template = template
        .or_else(|| profile.map(|options| options.key_template.as_str()))
        .unwrap_or(&config.key_template);
    let ext = ext.or_else(|| profile.and_then(ProfileOptions::convert_to));
    (template, ext)
}

/// Execute the key command
///
/// # Errors
///
/// Returns `BucketviewError` if stored settings cannot be read.
pub fn execute<S: KeyValueStore>(
    store: S,
    filename: &str,
    template: Option<&str>,
    ext: Option<&str>,
    config: &BucketviewConfig,
    quiet: bool,
) -> Result<()> {
    let settings = SettingsStore::open(store)?;
    let profile = match settings.stored_state()? {
        StoredSettings::Missing => None,
        _ => settings.active().map(|(_, options)| options),
    };
    let (template, ext) = resolve(template, ext, profile, config);

    let mut context = KeyTemplateContext::bind(filename, Utc::now(), &mut UlidGenerator::new());
    context.set_target_extension(ext);
    let key = render(template, &context);
    debug!(template, %key, "rendered key");

    if quiet {
        println!("{key}");
    } else {
        println!("{filename} -> {key}");
    }
    Ok(())
}
