//! Bucketview CLI application entry point
//!
//! This is the main executable for bucketview. It exposes the gallery core
//! on the command line: filtering bucket listings, computing layouts,
//! previewing upload keys and maintaining stored settings.
//!
//! # Usage
//!
//! ```bash
//! # Photos from the last week whose key mentions "beach"
//! bucketview filter listing.json --range 7d --search beach
//!
//! # Remember criteria, then reuse them
//! bucketview filter listing.json --prefix 2024/ --save
//! bucketview filter listing.json
//!
//! # Justified rows for three images in a 500px container
//! bucketview layout 2 1 1 --width 500 --gap 10
//!
//! # Preview an upload key
//! bucketview key holiday.png --ext webp
//!
//! # Upgrade settings written by an older release
//! bucketview settings migrate
//! ```
//!
//! # Configuration
//!
//! Configuration is stored in the user's config directory
//! (`~/.config/bucketview/config.toml` on Linux) and created with defaults on
//! first run. `BUCKETVIEW_*` environment variables override it.

use bucketview::{
    BucketviewError,
    cli::{Cli, Commands},
    commands::{self, filter::FilterFlags, layout::options as layout_options},
    config::BucketviewConfig,
    store::SledStore,
};
use tracing_subscriber::EnvFilter;

type Result<T> = std::result::Result<T, BucketviewError>;

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

fn open_store(config: &BucketviewConfig) -> Result<SledStore> {
    let path = config.resolved_store_path()?;
    Ok(SledStore::open(path)?)
}

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_tracing(cli.verbose);

    let config = BucketviewConfig::load()?;
    let quiet = cli.quiet || config.quiet;

    match &cli.command {
        Commands::Filter {
            listing,
            criteria,
            fuzzy,
            threshold,
            save,
            reset,
            print_query,
            width,
        } => {
            let flags = FilterFlags {
                fuzzy: *fuzzy,
                threshold: *threshold,
                save: *save,
                reset: *reset,
                print_query: *print_query,
                width: *width,
            };
            commands::filter(open_store(&config)?, listing, criteria, flags, &config, quiet)?;
        }
        Commands::Layout {
            items,
            width,
            gap,
            row_height,
        } => {
            let options = layout_options(&config, *gap, *row_height);
            commands::layout(items, *width, &options, quiet)?;
        }
        Commands::Key { filename, template, ext } => {
            commands::key(
                open_store(&config)?,
                filename,
                template.as_deref(),
                ext.as_deref(),
                &config,
                quiet,
            )?;
        }
        Commands::Settings { command } => {
            commands::settings(open_store(&config)?, command, quiet)?;
        }
        Commands::Config { command } => {
            commands::config(&config, command)?;
        }
    }

    Ok(())
}
